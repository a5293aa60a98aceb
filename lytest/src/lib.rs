//! Layout regression testing: stored references, XOR test runs, and a git
//! external diff driver for GDS/OASIS files.
//!
//! The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (extension allow-lists, test
//!   naming, git driver argument policy). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (test module loading, subprocesses,
//!   git, the XOR engine and the viewer). Collaborators sit behind traits so
//!   tests can script them.
//!
//! Command modules ([`store`], [`run`], [`diff`], [`git_diff`], [`git_config`])
//! coordinate core logic with I/O to implement the CLI commands.

pub mod core;
pub mod diff;
pub mod exit_codes;
pub mod git_config;
pub mod git_diff;
pub mod io;
pub mod logging;
pub mod run;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
