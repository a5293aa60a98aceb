//! `lytest run`: run one XOR test against its stored reference.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

use crate::core::test_name::run_candidates;
use crate::io::harness::TestInvoker;
use crate::io::loader::{LayoutTest, Lookup, TestLoader};
use crate::store::SUCCESS;

/// No name following the `test_*` / `*_test` convention resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No test-shaped version of {name} was found")]
pub struct NoDiscoverableTest {
    pub name: String,
}

/// Resolve `name` in `testfile` under the test naming convention.
///
/// Names already shaped like tests are looked up as given; anything else is
/// tried as `test_<name>` and then `<name>_test`.
pub fn resolve_runnable(
    loader: &mut TestLoader,
    testfile: &Path,
    name: &str,
) -> Result<LayoutTest> {
    for candidate in run_candidates(name) {
        match loader.lookup(testfile, &candidate)? {
            Lookup::Found(test) => {
                debug!(requested = name, resolved = %test.name, "resolved test");
                return Ok(test);
            }
            Lookup::NotFound => debug!(candidate = %candidate, "candidate not found"),
        }
    }
    Err(NoDiscoverableTest {
        name: name.to_string(),
    }
    .into())
}

/// Resolve and invoke the test, printing the success marker when it passes.
pub fn run_test(
    loader: &mut TestLoader,
    invoker: &dyn TestInvoker,
    testfile: &Path,
    testname: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let test = resolve_runnable(loader, testfile, testname)?;
    invoker.invoke(&test)?;
    writeln!(out, "{SUCCESS}").context("write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingInvoker, write_file};

    fn run(module: &str, name: &str) -> (Result<()>, RecordingInvoker, String) {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = write_file(temp.path(), "mytest.toml", module).expect("module");
        let invoker = RecordingInvoker::new();
        let mut out = Vec::new();
        let result = run_test(&mut TestLoader::new(), &invoker, &file, name, &mut out);
        (result, invoker, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn bare_name_resolves_test_prefix() {
        let (result, invoker, out) = run("[test_foo]\ncommand = [\"true\"]\n", "foo");
        result.expect("run");
        assert_eq!(invoker.invoked(), vec!["test_foo"]);
        assert_eq!(out, "Success\n");
    }

    #[test]
    fn bare_name_resolves_test_suffix() {
        let (result, invoker, _) = run("[foo_test]\ncommand = [\"true\"]\n", "foo");
        result.expect("run");
        assert_eq!(invoker.invoked(), vec!["foo_test"]);
    }

    #[test]
    fn prefix_wins_when_both_exist() {
        let module = "[foo_test]\ncommand = [\"true\"]\n\n[test_foo]\ncommand = [\"true\"]\n";
        let (result, invoker, _) = run(module, "foo");
        result.expect("run");
        assert_eq!(invoker.invoked(), vec!["test_foo"]);
    }

    /// A plain `foo` entry is never invoked under the bare name.
    #[test]
    fn no_discoverable_test_invokes_nothing() {
        let (result, invoker, out) = run("[foo]\ncommand = [\"true\"]\n", "foo");
        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<NoDiscoverableTest>(),
            Some(&NoDiscoverableTest {
                name: "foo".to_string()
            })
        );
        assert!(!err.to_string().contains("mytest.toml"));
        assert!(invoker.invoked().is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn test_shaped_name_is_not_expanded() {
        let (result, invoker, _) = run("[test_test_foo]\ncommand = [\"true\"]\n", "test_foo");
        assert!(
            result
                .unwrap_err()
                .downcast_ref::<NoDiscoverableTest>()
                .is_some()
        );
        assert!(invoker.invoked().is_empty());
    }

    #[test]
    fn invoker_failure_propagates_without_success() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file =
            write_file(temp.path(), "mytest.toml", "[test_foo]\ncommand = [\"true\"]\n")
                .expect("module");
        let invoker = RecordingInvoker::failing("layouts differ");
        let mut out = Vec::new();

        let err = run_test(&mut TestLoader::new(), &invoker, &file, "foo", &mut out).unwrap_err();

        assert_eq!(err.to_string(), "layouts differ");
        assert!(out.is_empty());
    }

    #[test]
    fn fallback_loads_module_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = write_file(temp.path(), "mytest.toml", "[foo_test]\ncommand = [\"true\"]\n")
            .expect("module");
        let mut loader = TestLoader::new();
        resolve_runnable(&mut loader, &file, "foo").expect("resolve");
        assert_eq!(loader.loaded_count(), 1);
    }
}
