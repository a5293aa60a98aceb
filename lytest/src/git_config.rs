//! `lytest git-config`: register lytest as git's diff driver for layout files.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{info, instrument};

use crate::core::formats::ATTRIBUTE_EXTENSIONS;
use crate::io::config::GitDriverConfig;
use crate::io::git::{ConfigScope, Git};

/// Environment used to locate the global attributes file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeDirs {
    pub home: Option<PathBuf>,
    pub xdg_config_home: Option<PathBuf>,
}

impl HomeDirs {
    pub fn from_env() -> Self {
        let non_empty = |value: Option<OsString>| value.filter(|v| !v.is_empty()).map(PathBuf::from);
        Self {
            home: non_empty(std::env::var_os("HOME")),
            xdg_config_home: non_empty(std::env::var_os("XDG_CONFIG_HOME")),
        }
    }

    /// Expand a leading `~/` the way git does for `core.attributesFile`.
    fn expand(&self, value: &str) -> Result<PathBuf> {
        match value.strip_prefix("~/") {
            Some(rest) => {
                let home = self
                    .home
                    .as_ref()
                    .ok_or_else(|| anyhow!("HOME is not set; cannot expand {value}"))?;
                Ok(home.join(rest))
            }
            None => Ok(PathBuf::from(value)),
        }
    }

    /// Git's default global attributes file when `core.attributesFile` is unset.
    fn default_attributes(&self) -> Result<PathBuf> {
        if let Some(xdg) = &self.xdg_config_home {
            return Ok(xdg.join("git").join("attributes"));
        }
        let home = self
            .home
            .as_ref()
            .ok_or_else(|| anyhow!("HOME is not set; cannot locate global git attributes"))?;
        Ok(home.join(".config").join("git").join("attributes"))
    }
}

/// One attributes line per layout extension, routing it to `driver`.
pub fn attribute_lines(driver: &str) -> String {
    ATTRIBUTE_EXTENSIONS
        .iter()
        .map(|ext| format!("*.{ext}  diff={driver}\n"))
        .collect()
}

/// Set `diff.<driver>.command` / `.binary` and append the attribute lines.
///
/// The append is not deduplicated; running twice writes the lines twice.
/// Returns the attributes file that was written.
#[instrument(skip_all, fields(scope = ?scope, driver = %driver.driver))]
pub fn install_git_driver(
    git: &Git,
    scope: ConfigScope,
    driver: &GitDriverConfig,
    dirs: &HomeDirs,
) -> Result<PathBuf> {
    let name = &driver.driver;
    git.config_set(scope, &format!("diff.{name}.command"), &driver.command)?;
    git.config_set(scope, &format!("diff.{name}.binary"), "true")?;

    let attributes = match scope {
        ConfigScope::Local => git.git_path("info/attributes")?,
        ConfigScope::Global => match git.config_get(ConfigScope::Global, "core.attributesFile")? {
            Some(configured) => dirs.expand(&configured)?,
            None => dirs.default_attributes()?,
        },
    };
    append_lines(&attributes, &attribute_lines(name))?;
    info!(attributes = %attributes.display(), "git diff driver installed");
    Ok(attributes)
}

fn append_lines(path: &Path, lines: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.write_all(lines.as_bytes())
        .with_context(|| format!("append to {}", path.display()))
}
