//! Test module loading with a per-process module cache.
//!
//! A test module is a TOML file in which every top-level table is one layout
//! test. The key is the test name; the table says how to generate the layout:
//!
//! ```toml
//! [test_ring]
//! command = ["python3", "ring.py", "{{ output }}"]
//! extension = "oas"
//! tolerance = 2
//! ```
//!
//! Modules are cached by canonical path, so a file is read and validated at
//! most once per [`TestLoader`] even when several names are looked up in it.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::core::formats::is_diff_extension;
use crate::core::test_name::is_identifier;
use crate::core::types::DEFAULT_TOLERANCE;

/// A test module file could not be read or did not describe valid tests.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Error loading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error loading {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Error loading {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

impl LoadError {
    /// The offending test module file.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::Invalid { path, .. } => path,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTest {
    command: Vec<String>,
    extension: Option<String>,
    tolerance: Option<u32>,
    timeout_secs: Option<u64>,
}

/// One named layout test resolved from a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutTest {
    pub name: String,
    /// Directory of the module file; generators run here and layout dirs are
    /// resolved against it.
    pub module_dir: PathBuf,
    /// Generator argv template; variables: `output`, `name`, `module_dir`.
    pub command: Vec<String>,
    /// Layout extension override (without dot).
    pub extension: Option<String>,
    /// XOR tolerance in database units.
    pub tolerance: u32,
    /// Generator timeout override.
    pub timeout_secs: Option<u64>,
}

/// A loaded test module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestModule {
    /// Canonical path of the module file; also its cache key.
    pub path: PathBuf,
    tests: BTreeMap<String, LayoutTest>,
}

impl TestModule {
    pub fn get(&self, name: &str) -> Option<&LayoutTest> {
        self.tests.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tests.keys().map(String::as_str)
    }
}

/// Result of looking a name up in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(LayoutTest),
    NotFound,
}

/// Loads test modules and owns the module cache for the process.
#[derive(Debug, Default)]
pub struct TestLoader {
    modules: HashMap<PathBuf, Rc<TestModule>>,
}

impl TestLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct modules loaded so far.
    #[cfg(test)]
    pub fn loaded_count(&self) -> usize {
        self.modules.len()
    }

    /// Load `file`, reusing the cached module if it was loaded before.
    #[instrument(skip_all, fields(file = %file.display()))]
    pub fn load_module(&mut self, file: &Path) -> Result<Rc<TestModule>, LoadError> {
        let key = fs::canonicalize(file).map_err(|source| LoadError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        if let Some(module) = self.modules.get(&key) {
            debug!("module cache hit");
            return Ok(Rc::clone(module));
        }
        let module = Rc::new(parse_module(file, &key)?);
        debug!(tests = module.tests.len(), "module loaded");
        self.modules.insert(key, Rc::clone(&module));
        Ok(module)
    }

    /// Look `name` up in the module at `file`.
    pub fn lookup(&mut self, file: &Path, name: &str) -> Result<Lookup, LoadError> {
        let module = self.load_module(file)?;
        Ok(match module.get(name) {
            Some(test) => Lookup::Found(test.clone()),
            None => Lookup::NotFound,
        })
    }
}

fn parse_module(file: &Path, canonical: &Path) -> Result<TestModule, LoadError> {
    let invalid = |message: String| LoadError::Invalid {
        path: file.to_path_buf(),
        message,
    };
    let contents = fs::read_to_string(canonical).map_err(|source| LoadError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let raw: BTreeMap<String, RawTest> =
        toml::from_str(&contents).map_err(|source| LoadError::Parse {
            path: file.to_path_buf(),
            source,
        })?;
    let module_dir = canonical
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| invalid("module file has no parent directory".to_string()))?;

    let mut tests = BTreeMap::new();
    for (name, raw) in raw {
        if !is_identifier(&name) {
            return Err(invalid(format!("'{name}' is not a valid test name")));
        }
        if raw.command.is_empty() || raw.command[0].trim().is_empty() {
            return Err(invalid(format!("{name}.command must be a non-empty array")));
        }
        if let Some(ext) = &raw.extension
            && !is_diff_extension(ext)
        {
            return Err(invalid(format!(
                "{name}.extension '{ext}' is not a layout format"
            )));
        }
        if raw.timeout_secs == Some(0) {
            return Err(invalid(format!("{name}.timeout_secs must be > 0")));
        }
        let test = LayoutTest {
            name: name.clone(),
            module_dir: module_dir.clone(),
            command: raw.command,
            extension: raw.extension,
            tolerance: raw.tolerance.unwrap_or(DEFAULT_TOLERANCE),
            timeout_secs: raw.timeout_secs,
        };
        tests.insert(name, test);
    }

    Ok(TestModule {
        path: canonical.to_path_buf(),
        tests,
    })
}
