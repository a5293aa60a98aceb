//! lytest configuration stored in `lytest.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::formats::is_diff_extension;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "lytest.toml";

static DRIVER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// lytest configuration (TOML).
///
/// Missing sections and fields fall back to the defaults below, so an absent
/// file is equivalent to an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LytestConfig {
    pub xor: XorConfig,
    pub viewer: ViewerConfig,
    pub layouts: LayoutsConfig,
    pub tests: TestsConfig,
    pub git: GitDriverConfig,
}

/// External XOR engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct XorConfig {
    /// Argv template; variables: `reference`, `test`, `tolerance`, `verbose`.
    pub command: Vec<String>,
    /// Exit codes meaning "layouts differ". Exit 0 means identical.
    pub mismatch_exit_codes: Vec<i32>,
    pub timeout_secs: u64,
    pub output_limit_bytes: usize,
}

impl Default for XorConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "strmxor".to_string(),
                "{{ reference }}".to_string(),
                "{{ test }}".to_string(),
            ],
            mismatch_exit_codes: vec![1],
            timeout_secs: 10 * 60,
            output_limit_bytes: 100_000,
        }
    }
}

/// External layout viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Argv template; variables: `file`, `mode`. Empty disables the viewer.
    pub command: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            command: vec!["klayout".to_string(), "{{ file }}".to_string()],
        }
    }
}

/// Where reference and generated layouts live, relative to the test module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutsConfig {
    pub reference_dir: PathBuf,
    pub run_dir: PathBuf,
    /// Extension for tests that do not set their own.
    pub extension: String,
}

impl Default for LayoutsConfig {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::from("ref_layouts"),
            run_dir: PathBuf::from("run_layouts"),
            extension: "gds".to_string(),
        }
    }
}

/// Limits for test layout generators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TestsConfig {
    pub timeout_secs: u64,
    pub output_limit_bytes: usize,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30 * 60,
            output_limit_bytes: 100_000,
        }
    }
}

/// Names written by `lytest git-config`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GitDriverConfig {
    /// Diff driver name (`diff.<driver>.*`, `diff=<driver>`).
    pub driver: String,
    /// Value of `diff.<driver>.command`.
    pub command: String,
}

impl Default for GitDriverConfig {
    fn default() -> Self {
        Self {
            driver: "lytest".to_string(),
            command: "lytest git-diff".to_string(),
        }
    }
}

impl LytestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.xor.command.is_empty() || self.xor.command[0].trim().is_empty() {
            return Err(anyhow!("xor.command must be a non-empty array"));
        }
        if self.xor.mismatch_exit_codes.contains(&0) {
            return Err(anyhow!("xor.mismatch_exit_codes must not contain 0"));
        }
        if self.xor.timeout_secs == 0 {
            return Err(anyhow!("xor.timeout_secs must be > 0"));
        }
        if self.xor.output_limit_bytes == 0 {
            return Err(anyhow!("xor.output_limit_bytes must be > 0"));
        }
        if let Some(program) = self.viewer.command.first()
            && program.trim().is_empty()
        {
            return Err(anyhow!("viewer.command must start with a program"));
        }
        if !is_diff_extension(&self.layouts.extension) {
            return Err(anyhow!(
                "layouts.extension '{}' is not a layout format",
                self.layouts.extension
            ));
        }
        if self.tests.timeout_secs == 0 {
            return Err(anyhow!("tests.timeout_secs must be > 0"));
        }
        if self.tests.output_limit_bytes == 0 {
            return Err(anyhow!("tests.output_limit_bytes must be > 0"));
        }
        if !DRIVER_RE.is_match(&self.git.driver) {
            return Err(anyhow!(
                "git.driver '{}' must match [A-Za-z0-9_-]+",
                self.git.driver
            ));
        }
        if self.git.command.trim().is_empty() {
            return Err(anyhow!("git.command must be non-empty"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `LytestConfig::default()`.
pub fn load_config(path: &Path) -> Result<LytestConfig> {
    if !path.exists() {
        let cfg = LytestConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: LytestConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
