//! `lytest git-diff`: external diff driver invoked by git.
//!
//! Not meant to be run by hand; `lytest git-config` registers it as
//! `diff.<driver>.command`.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::formats::{GIT_EXTENSIONS, check_extension};
use crate::core::git_request::{GitDiffDecision, GitDiffRequest};
use crate::core::types::{ViewerPane, XorOutcome};
use crate::io::viewer::Viewer;
use crate::io::xor::DiffEngine;

pub const REFUSE_SIMILAR_MSG: &str = "Refusing to process similar files without the same name";
pub const LAYOUTS_DIFFER_MSG: &str = "Layouts differ:";

/// Tolerance git comparisons always use.
const GIT_TOLERANCE: u32 = 1;

/// What the driver did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitDiffOutcome {
    Refused,
    Compared(XorOutcome),
}

/// Apply the refusal policy, then XOR old (reference) against new (test).
pub fn git_diff(
    engine: &dyn DiffEngine,
    viewer: &dyn Viewer,
    request: &GitDiffRequest,
    out: &mut dyn Write,
) -> Result<GitDiffOutcome> {
    let (reference, test) = match request.decide() {
        GitDiffDecision::RefuseSimilar { lines } => {
            info!(path = %request.path, "refusing rename/copy pair");
            writeln!(out, "{REFUSE_SIMILAR_MSG}").context("write output")?;
            for line in lines {
                writeln!(out, "{line}").context("write output")?;
            }
            return Ok(GitDiffOutcome::Refused);
        }
        GitDiffDecision::RefuseMissing {
            path,
            old_file,
            new_file,
        } => {
            info!(path = %path, "refusing pair missing on one side");
            writeln!(
                out,
                "File {path} does not exist on both commits ({old_file}, {new_file})"
            )
            .context("write output")?;
            return Ok(GitDiffOutcome::Refused);
        }
        GitDiffDecision::Compare { reference, test } => (reference, test),
    };

    for file in [&reference, &test] {
        check_extension(file, GIT_EXTENSIONS)?;
    }

    let outcome = engine.run_xor(&reference, &test, GIT_TOLERANCE, false)?;
    debug!(path = %request.path, ?outcome, "git diff finished");
    if outcome == XorOutcome::Mismatch {
        writeln!(out, "{LAYOUTS_DIFFER_MSG}").context("write output")?;
        writeln!(out, "   {}", test.display()).context("write output")?;
        writeln!(out, "   {}", reference.display()).context("write output")?;
        viewer.ipc_load(&reference, ViewerPane::Reference)?;
        viewer.ipc_load(&test, ViewerPane::Test)?;
    }
    Ok(GitDiffOutcome::Compared(outcome))
}
