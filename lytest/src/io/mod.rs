//! I/O helpers for lytest commands.

pub mod config;
pub mod git;
pub mod harness;
pub mod loader;
pub mod process;
pub mod template;
pub mod viewer;
pub mod xor;
