//! Deterministic, pure logic shared by the lytest commands.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod formats;
pub mod git_request;
pub mod test_name;
pub mod types;
