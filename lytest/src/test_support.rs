//! Test-only helpers: scripted collaborators and a throwaway git repository.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::core::types::{ViewerPane, XorOutcome};
use crate::io::harness::{ReferenceStore, TestInvoker};
use crate::io::loader::LayoutTest;
use crate::io::viewer::Viewer;
use crate::io::xor::DiffEngine;

/// Arguments of one `run_xor` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorCall {
    pub reference: PathBuf,
    pub test: PathBuf,
    pub tolerance: u32,
    pub verbose: bool,
}

/// Diff engine returning queued outcomes in order and recording its calls.
///
/// Errors once the queue is empty, so an unexpected call fails the test.
pub struct ScriptedDiffEngine {
    outcomes: RefCell<VecDeque<XorOutcome>>,
    calls: RefCell<Vec<XorCall>>,
}

impl ScriptedDiffEngine {
    pub fn new(outcomes: Vec<XorOutcome>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<XorCall> {
        self.calls.borrow().clone()
    }
}

impl DiffEngine for ScriptedDiffEngine {
    fn run_xor(
        &self,
        reference: &Path,
        test: &Path,
        tolerance: u32,
        verbose: bool,
    ) -> Result<XorOutcome> {
        self.calls.borrow_mut().push(XorCall {
            reference: reference.to_path_buf(),
            test: test.to_path_buf(),
            tolerance,
            verbose,
        });
        self.outcomes
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected run_xor call"))
    }
}

/// Viewer that records what it was asked to open.
#[derive(Default)]
pub struct RecordingViewer {
    loads: RefCell<Vec<(PathBuf, u8)>>,
}

impl RecordingViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(file, mode)` pairs in call order.
    pub fn loads(&self) -> Vec<(PathBuf, u8)> {
        self.loads.borrow().clone()
    }
}

impl Viewer for RecordingViewer {
    fn ipc_load(&self, file: &Path, pane: ViewerPane) -> Result<()> {
        self.loads
            .borrow_mut()
            .push((file.to_path_buf(), pane.mode()));
        Ok(())
    }
}

/// Reference store and invoker that only record test names.
#[derive(Default)]
pub struct RecordingInvoker {
    stored: RefCell<Vec<String>>,
    invoked: RefCell<Vec<String>>,
    fail_with: Option<String>,
}

impl RecordingInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every store/invoke call fail with `message` (after recording it).
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Vec<String> {
        self.stored.borrow().clone()
    }

    pub fn invoked(&self) -> Vec<String> {
        self.invoked.borrow().clone()
    }

    fn outcome(&self) -> Result<()> {
        match &self.fail_with {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(()),
        }
    }
}

impl ReferenceStore for RecordingInvoker {
    fn store_reference(&self, test: &LayoutTest) -> Result<PathBuf> {
        self.stored.borrow_mut().push(test.name.clone());
        self.outcome()?;
        Ok(test.module_dir.join(format!("{}.gds", test.name)))
    }
}

impl TestInvoker for RecordingInvoker {
    fn invoke(&self, test: &LayoutTest) -> Result<()> {
        self.invoked.borrow_mut().push(test.name.clone());
        self.outcome()
    }
}

/// Freshly initialised git repository in a temporary directory.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp repo dir")?;
        let status = Command::new("git")
            .args(["init", "-q"])
            .current_dir(dir.path())
            .status()
            .context("spawn git init")?;
        if !status.success() {
            return Err(anyhow!("git init failed: {status}"));
        }
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Write `contents` to `dir/name`, returning the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
