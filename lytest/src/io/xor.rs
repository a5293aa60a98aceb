//! XOR engine abstraction.
//!
//! The [`DiffEngine`] trait decouples the commands from the geometry XOR
//! backend. The shipped backend runs a configured external program; tests use
//! scripted engines that return predetermined outcomes without spawning
//! processes.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use minijinja::context;
use tracing::{debug, info, instrument};

use crate::core::types::{DEFAULT_TOLERANCE, XorOutcome};
use crate::io::config::XorConfig;
use crate::io::process::run_command_with_timeout;
use crate::io::template::{command_from_argv, references_variable, render_argv};

/// Abstraction over geometry XOR backends.
pub trait DiffEngine {
    /// Compare `test` against `reference` within `tolerance` database units.
    fn run_xor(
        &self,
        reference: &Path,
        test: &Path,
        tolerance: u32,
        verbose: bool,
    ) -> Result<XorOutcome>;
}

/// Engine that runs `xor.command` and classifies its exit code.
#[derive(Debug, Clone)]
pub struct CommandDiffEngine {
    config: XorConfig,
}

impl CommandDiffEngine {
    pub fn new(config: XorConfig) -> Self {
        Self { config }
    }
}

impl DiffEngine for CommandDiffEngine {
    #[instrument(skip_all, fields(reference = %reference.display(), test = %test.display(), tolerance = tolerance))]
    fn run_xor(
        &self,
        reference: &Path,
        test: &Path,
        tolerance: u32,
        verbose: bool,
    ) -> Result<XorOutcome> {
        if tolerance != DEFAULT_TOLERANCE
            && !references_variable(&self.config.command, "tolerance")?
        {
            return Err(anyhow!(
                "tolerance {tolerance} requested but xor.command does not use {{{{ tolerance }}}}"
            ));
        }
        let argv = render_argv(
            &self.config.command,
            context! {
                reference => reference.display().to_string(),
                test => test.display().to_string(),
                tolerance => tolerance,
                verbose => verbose,
            },
        )
        .context("render xor.command")?;
        debug!(?argv, "running xor engine");
        let cmd = command_from_argv(&argv)?;
        let output = run_command_with_timeout(
            cmd,
            Duration::from_secs(self.config.timeout_secs),
            self.config.output_limit_bytes,
        )
        .context("run xor engine")?;

        if verbose {
            eprint!("{}", output.stdout_text());
        }
        if output.timed_out {
            return Err(anyhow!(
                "xor engine timed out after {}s",
                self.config.timeout_secs
            ));
        }
        let outcome = classify_exit(output.status.code(), &self.config.mismatch_exit_codes)
            .ok_or_else(|| {
                anyhow!(
                    "xor engine failed ({}): {}",
                    output.status,
                    output.stderr_text()
                )
            })?;
        info!(?outcome, "xor finished");
        Ok(outcome)
    }
}

/// Map an engine exit code to an outcome; `None` means the engine failed.
fn classify_exit(code: Option<i32>, mismatch_codes: &[i32]) -> Option<XorOutcome> {
    match code {
        Some(0) => Some(XorOutcome::Match),
        Some(code) if mismatch_codes.contains(&code) => Some(XorOutcome::Mismatch),
        _ => None,
    }
}
