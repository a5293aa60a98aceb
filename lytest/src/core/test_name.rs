//! Naming convention for runnable layout tests.

use std::sync::LazyLock;

use regex::Regex;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// True if `name` is usable as a test name inside a test module.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// True if `name` already follows the `test_*` / `*_test` convention.
pub fn is_test_shaped(name: &str) -> bool {
    name.starts_with("test_") || name.ends_with("_test")
}

/// Names to try, in order, when resolving `name` for `lytest run`.
pub fn run_candidates(name: &str) -> Vec<String> {
    if is_test_shaped(name) {
        return vec![name.to_string()];
    }
    vec![format!("test_{name}"), format!("{name}_test")]
}
