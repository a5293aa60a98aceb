//! Git external diff driver arguments and refusal policy.
//!
//! Git runs the driver as
//! `<cmd> path old-file old-hex old-mode new-file new-hex new-mode`, appending
//! the new path and the rename/copy message when it detected a similarity
//! pair. For a side that does not exist git passes `/dev/null` with `.` as hex
//! and mode. Unmerged paths only get `path`.

use std::path::PathBuf;

/// Marker git uses for the hex/mode of a side that does not exist.
const MISSING_MARKER: &str = ".";

/// Positional tokens received from git.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitDiffRequest {
    pub path: String,
    pub old_file: Option<String>,
    pub old_hex: Option<String>,
    pub old_mode: Option<String>,
    pub new_file: Option<String>,
    pub new_hex: Option<String>,
    pub new_mode: Option<String>,
    /// Extra tokens git appends for rename/copy pairs.
    pub similarity: Vec<String>,
}

/// What the driver should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitDiffDecision {
    /// Rename/copy pair; never compared.
    RefuseSimilar { lines: Vec<String> },
    /// One side is missing from the commit range.
    RefuseMissing {
        path: String,
        old_file: String,
        new_file: String,
    },
    /// Both sides exist; compare old (reference) against new (test).
    Compare { reference: PathBuf, test: PathBuf },
}

impl GitDiffRequest {
    pub fn decide(&self) -> GitDiffDecision {
        if !self.similarity.is_empty() {
            return GitDiffDecision::RefuseSimilar {
                lines: self.similarity.clone(),
            };
        }

        let new_mode_missing = self
            .new_mode
            .as_deref()
            .is_none_or(|mode| mode == MISSING_MARKER);
        let old_present = self.old_file.as_deref().filter(|f| !is_null_device(f));
        let new_present = self.new_file.as_deref().filter(|f| !is_null_device(f));

        match (old_present, new_present) {
            (Some(old), Some(new)) if !new_mode_missing => GitDiffDecision::Compare {
                reference: PathBuf::from(old),
                test: PathBuf::from(new),
            },
            _ => GitDiffDecision::RefuseMissing {
                path: self.path.clone(),
                old_file: self.old_file.clone().unwrap_or_default(),
                new_file: self.new_file.clone().unwrap_or_default(),
            },
        }
    }
}

/// True if `file` names the platform null device as git spells it.
pub fn is_null_device(file: &str) -> bool {
    if file == "/dev/null" {
        return true;
    }
    cfg!(windows) && file.eq_ignore_ascii_case("nul")
}
