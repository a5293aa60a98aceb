//! Git adapter for `lytest git-config`.
//!
//! We keep a small, explicit wrapper around `git` subprocess calls instead of
//! editing config files by hand, so git resolves scopes and paths itself.

use std::path::PathBuf;
use std::process::{Command, Output};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

/// Which git configuration file a setting is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// The repository's own `config` (`--local`).
    Local,
    /// The user's global config (`--global`).
    Global,
}

impl ConfigScope {
    fn flag(self) -> &'static str {
        match self {
            ConfigScope::Local => "--local",
            ConfigScope::Global => "--global",
        }
    }
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Set `key` to `value` in the given scope.
    #[instrument(skip_all, fields(key = %key, scope = ?scope))]
    pub fn config_set(&self, scope: ConfigScope, key: &str, value: &str) -> Result<()> {
        debug!(key, value, "setting git config");
        self.run_checked(&["config", scope.flag(), key, value])?;
        Ok(())
    }

    /// Read `key` from the given scope. Returns `None` when it is unset.
    pub fn config_get(&self, scope: ConfigScope, key: &str) -> Result<Option<String>> {
        let args = ["config", scope.flag(), "--get", key];
        let output = self.run(&args)?;
        // `git config --get` exits 1 when the key is missing.
        if output.status.code() == Some(1) {
            return Ok(None);
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(value))
    }

    /// Resolve a path inside the repository's git directory (`git rev-parse --git-path`).
    ///
    /// The result is absolute; git reports it relative to the workdir.
    pub fn git_path(&self, relative: &str) -> Result<PathBuf> {
        let out = self.run_capture(&["rev-parse", "--git-path", relative])?;
        let path = PathBuf::from(out.trim());
        if path.is_absolute() {
            return Ok(path);
        }
        Ok(self.workdir.join(path))
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))
    }
}
