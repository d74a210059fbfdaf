//! Export and session hooks that report back through notices.

use crate::config::{CanvasConfig, ExportConfig};
use crate::export::{self, ExportError};
use crate::notification::Notice;
use crate::session::{self, SessionOptions};
use log::warn;
use std::path::PathBuf;

use super::InputState;

impl InputState {
    /// Exports the active document as PNG.
    pub fn export_active(&mut self, config: &ExportConfig) -> Result<PathBuf, ExportError> {
        let result = export::save_document(
            self.workspace.active(),
            &mut self.image_cache,
            &self.font,
            config,
        );
        match &result {
            Ok(path) => self
                .notices
                .push(Notice::new("Image saved", path.display().to_string())),
            Err(err) => self
                .notices
                .push(Notice::new("Export failed", err.to_string())),
        }
        result
    }

    /// Exports every non-empty document, one after another. Returns how many
    /// were written.
    pub async fn export_all(&mut self, config: &ExportConfig) -> usize {
        let results =
            export::save_all(&self.workspace, &mut self.image_cache, &self.font, config).await;
        let saved = results.iter().filter(|r| r.is_ok()).count();
        let failed = results.len() - saved;

        let body = if failed == 0 {
            format!("{} image(s) saved", saved)
        } else {
            format!("{} image(s) saved, {} failed", saved, failed)
        };
        self.notices.push(Notice::new("Save all", body));
        saved
    }

    /// Writes the open documents to the session file.
    pub fn save_session(&mut self, options: &SessionOptions) -> bool {
        let snapshot = session::snapshot_from_workspace(&self.workspace);
        match session::save_snapshot(&snapshot, options) {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed to save session: {:#}", err);
                self.notices
                    .push(Notice::new("Session not saved", format!("{:#}", err)));
                false
            }
        }
    }

    /// Replaces the open documents with the saved session, if there is one.
    pub fn restore_session(&mut self, options: &SessionOptions, canvas: &CanvasConfig) -> bool {
        match session::load_snapshot(options) {
            Ok(Some(snapshot)) => {
                let workspace =
                    session::restore_workspace(snapshot, canvas.default_width, canvas.default_height);
                self.replace_workspace(workspace);
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!("Failed to restore session: {:#}", err);
                self.notices
                    .push(Notice::new("Session not restored", format!("{:#}", err)));
                false
            }
        }
    }
}
