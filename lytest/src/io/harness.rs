//! Layout generation, reference storage, and XOR test invocation.
//!
//! Layouts live next to the test module:
//!
//! ```text
//! <module_dir>/
//!   ref_layouts/<test>.gds   known-good references (`lytest store`)
//!   run_layouts/<test>.gds   output of the latest generator run
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use minijinja::context;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::core::types::XorOutcome;
use crate::io::config::{LayoutsConfig, TestsConfig};
use crate::io::loader::LayoutTest;
use crate::io::process::run_command_with_timeout;
use crate::io::template::{command_from_argv, render_argv};
use crate::io::xor::DiffEngine;

/// A generated layout differs from its stored reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Layouts differ: {} vs reference {}", test.display(), reference.display())]
pub struct GeometryMismatch {
    pub reference: PathBuf,
    pub test: PathBuf,
}

/// Persists a test's output as its new reference.
pub trait ReferenceStore {
    /// Returns the path of the stored reference.
    fn store_reference(&self, test: &LayoutTest) -> Result<PathBuf>;
}

/// Runs a test end to end (generate, then compare against the reference).
pub trait TestInvoker {
    fn invoke(&self, test: &LayoutTest) -> Result<()>;
}

/// Filesystem-backed reference store and test invoker.
pub struct LayoutHarness<'a> {
    layouts: LayoutsConfig,
    tests: TestsConfig,
    engine: &'a dyn DiffEngine,
}

impl<'a> LayoutHarness<'a> {
    pub fn new(layouts: LayoutsConfig, tests: TestsConfig, engine: &'a dyn DiffEngine) -> Self {
        Self {
            layouts,
            tests,
            engine,
        }
    }

    pub fn reference_path(&self, test: &LayoutTest) -> PathBuf {
        self.layout_path(test, &self.layouts.reference_dir)
    }

    pub fn run_path(&self, test: &LayoutTest) -> PathBuf {
        self.layout_path(test, &self.layouts.run_dir)
    }

    fn layout_path(&self, test: &LayoutTest, dir: &Path) -> PathBuf {
        let ext = test.extension.as_deref().unwrap_or(&self.layouts.extension);
        test.module_dir.join(dir).join(format!("{}.{ext}", test.name))
    }

    /// Run the test's generator so that it writes `output`.
    #[instrument(skip_all, fields(test = %test.name, output = %output.display()))]
    fn generate(&self, test: &LayoutTest, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create layout dir {}", parent.display()))?;
        }
        if output.exists() {
            fs::remove_file(output)
                .with_context(|| format!("remove stale layout {}", output.display()))?;
        }

        let argv = render_argv(
            &test.command,
            context! {
                output => output.display().to_string(),
                name => test.name.as_str(),
                module_dir => test.module_dir.display().to_string(),
            },
        )
        .with_context(|| format!("render {}.command", test.name))?;
        let mut cmd = command_from_argv(&argv)?;
        cmd.current_dir(&test.module_dir);

        let timeout_secs = test.timeout_secs.unwrap_or(self.tests.timeout_secs);
        info!(?argv, "running layout generator");
        let result = run_command_with_timeout(
            cmd,
            Duration::from_secs(timeout_secs),
            self.tests.output_limit_bytes,
        )
        .with_context(|| format!("run generator for {}", test.name))?;

        if result.timed_out {
            bail!("generator for {} timed out after {timeout_secs}s", test.name);
        }
        if !result.status.success() {
            return Err(anyhow!(
                "generator for {} failed ({}): {}",
                test.name,
                result.status,
                result.stderr_text()
            ));
        }
        if !output.is_file() {
            bail!(
                "generator for {} did not write {}",
                test.name,
                output.display()
            );
        }
        debug!("layout generated");
        Ok(())
    }
}

impl ReferenceStore for LayoutHarness<'_> {
    /// Generate into the run directory first so a failing generator leaves
    /// the previous reference untouched.
    fn store_reference(&self, test: &LayoutTest) -> Result<PathBuf> {
        let generated = self.run_path(test);
        self.generate(test, &generated)?;

        let reference = self.reference_path(test);
        if let Some(parent) = reference.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create reference dir {}", parent.display()))?;
        }
        fs::copy(&generated, &reference).with_context(|| {
            format!(
                "copy {} to {}",
                generated.display(),
                reference.display()
            )
        })?;
        info!(test = %test.name, reference = %reference.display(), "reference stored");
        Ok(reference)
    }
}

impl TestInvoker for LayoutHarness<'_> {
    fn invoke(&self, test: &LayoutTest) -> Result<()> {
        let reference = self.reference_path(test);
        if !reference.is_file() {
            bail!(
                "no reference layout for {} at {} (run `lytest store` first)",
                test.name,
                reference.display()
            );
        }
        let generated = self.run_path(test);
        self.generate(test, &generated)?;

        match self
            .engine
            .run_xor(&reference, &generated, test.tolerance, false)?
        {
            XorOutcome::Match => Ok(()),
            XorOutcome::Mismatch => Err(GeometryMismatch {
                reference,
                test: generated,
            }
            .into()),
        }
    }
}
