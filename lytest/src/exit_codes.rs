//! Stable exit codes for lytest CLI commands.
//!
//! Usage errors keep clap's own exit code (2).

/// Command succeeded, found the layouts identical or different, or refused a git pair.
pub const OK: i32 = 0;
/// Command failed (load error, unknown format, failing test, git or engine error).
pub const FAILURE: i32 = 1;
