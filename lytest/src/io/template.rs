//! Argv templates for configured external programs.
//!
//! Each element of a command array is rendered on its own with minijinja, so
//! `["strmxor", "{{ reference }}", "{{ test }}"]` never needs shell quoting.

use std::process::Command;

use anyhow::{Context, Result, anyhow};
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

/// Render every argument of `template` against `ctx`.
///
/// Unknown variables are errors rather than empty strings.
pub fn render_argv<S: Serialize>(template: &[String], ctx: S) -> Result<Vec<String>> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    let ctx = minijinja::Value::from_serialize(&ctx);
    template
        .iter()
        .map(|arg| {
            env.render_str(arg, &ctx)
                .with_context(|| format!("render command argument '{arg}'"))
        })
        .collect()
}

/// True if any argument of `template` reads the variable `name`.
pub fn references_variable(template: &[String], name: &str) -> Result<bool> {
    let env = Environment::new();
    for arg in template {
        let parsed = env
            .template_from_str(arg)
            .with_context(|| format!("parse command argument '{arg}'"))?;
        if parsed.undeclared_variables(false).contains(name) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Build a `Command` from a rendered argv.
pub fn command_from_argv(argv: &[String]) -> Result<Command> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("command must be a non-empty array"))?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}
