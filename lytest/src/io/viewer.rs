//! Layout viewer dispatch.

use std::path::Path;

use anyhow::{Context, Result};
use minijinja::context;
use tracing::debug;

use crate::core::types::ViewerPane;
use crate::io::config::ViewerConfig;
use crate::io::process::spawn_detached;
use crate::io::template::{command_from_argv, render_argv};

/// Sends layouts to an interactive viewer. Fire-and-forget.
pub trait Viewer {
    fn ipc_load(&self, file: &Path, pane: ViewerPane) -> Result<()>;
}

/// Viewer that spawns `viewer.command` without waiting for it.
#[derive(Debug, Clone)]
pub struct CommandViewer {
    config: ViewerConfig,
}

impl CommandViewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }
}

impl Viewer for CommandViewer {
    fn ipc_load(&self, file: &Path, pane: ViewerPane) -> Result<()> {
        if self.config.command.is_empty() {
            debug!(file = %file.display(), %pane, "viewer disabled");
            return Ok(());
        }
        let argv = render_argv(
            &self.config.command,
            context! {
                file => file.display().to_string(),
                mode => pane.mode(),
            },
        )
        .context("render viewer.command")?;
        debug!(?argv, %pane, "sending layout to viewer");
        spawn_detached(command_from_argv(&argv)?)
            .with_context(|| format!("open {} in viewer", file.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_a_no_op() {
        let viewer = CommandViewer::new(ViewerConfig {
            command: Vec::new(),
        });
        viewer
            .ipc_load(Path::new("a.gds"), ViewerPane::Reference)
            .expect("no-op");
    }

    #[test]
    fn missing_program_is_an_error() {
        let viewer = CommandViewer::new(ViewerConfig {
            command: vec![
                "lytest-missing-viewer".to_string(),
                "{{ file }}".to_string(),
            ],
        });
        let err = viewer
            .ipc_load(Path::new("a.gds"), ViewerPane::Test)
            .unwrap_err();
        assert!(err.to_string().contains("a.gds"));
    }
}
