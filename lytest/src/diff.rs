//! `lytest diff`: XOR two layout files and open both in the viewer when they differ.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::core::formats::{DIFF_EXTENSIONS, check_extension};
use crate::core::types::{ViewerPane, XorOutcome};
use crate::io::viewer::Viewer;
use crate::io::xor::DiffEngine;

pub use crate::core::types::DEFAULT_TOLERANCE;

pub const DIFFERENT_MSG: &str = "These layouts are different.";

/// Compare `reference` against `test`. Identical layouts produce no output.
pub fn diff_files(
    engine: &dyn DiffEngine,
    viewer: &dyn Viewer,
    reference: &Path,
    test: &Path,
    tolerance: u32,
    out: &mut dyn Write,
) -> Result<XorOutcome> {
    for file in [reference, test] {
        if !file.is_file() {
            bail!("cannot open {}", file.display());
        }
        check_extension(file, DIFF_EXTENSIONS)?;
    }

    let outcome = engine.run_xor(reference, test, tolerance, false)?;
    debug!(?outcome, "diff finished");
    if outcome == XorOutcome::Mismatch {
        writeln!(out, "{DIFFERENT_MSG}").context("write output")?;
        viewer.ipc_load(reference, ViewerPane::Reference)?;
        viewer.ipc_load(test, ViewerPane::Test)?;
    }
    Ok(outcome)
}
