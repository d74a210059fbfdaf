use crate::config::Action;
use crate::document::Edit;
use crate::input::{events::Key, tool::Tool};
use log::{debug, info};

use super::{DrawingState, InputState};

impl InputState {
    /// Processes a key press event.
    ///
    /// Modifier keys only update [`InputState::modifiers`]. While a text box
    /// is open, plain keys edit the buffer and only Ctrl/Alt combinations
    /// reach the keybindings. Everything else is looked up in the action map.
    pub fn on_key_press(&mut self, key: Key) {
        match key {
            Key::Shift => {
                self.modifiers.shift = true;
                return;
            }
            Key::Ctrl => {
                self.modifiers.ctrl = true;
                return;
            }
            Key::Alt => {
                self.modifiers.alt = true;
                return;
            }
            _ => {}
        }

        if matches!(self.state, DrawingState::TextEditing { .. }) {
            if self.modifiers.ctrl || self.modifiers.alt {
                if let Some(action) = key.binding_name().and_then(|k| self.find_action(&k)) {
                    self.handle_action(action);
                }
                return;
            }
            self.edit_text(key);
            return;
        }

        let Some(key_str) = key.binding_name() else {
            return;
        };
        if let Some(action) = self.find_action(&key_str) {
            self.handle_action(action);
        }
    }

    /// Processes a key release event.
    pub fn on_key_release(&mut self, key: Key) {
        match key {
            Key::Shift => self.modifiers.shift = false,
            Key::Ctrl => self.modifiers.ctrl = false,
            Key::Alt => self.modifiers.alt = false,
            _ => {}
        }
    }

    /// Applies one key to the open text buffer.
    fn edit_text(&mut self, key: Key) {
        if key == Key::Escape {
            self.cancel_text_edit();
            return;
        }
        let DrawingState::TextEditing { buffer, .. } = &mut self.state else {
            return;
        };
        match key {
            Key::Char(c) => buffer.push(c),
            Key::Space => buffer.push(' '),
            Key::Return => buffer.push('\n'),
            Key::Tab => buffer.push('\t'),
            Key::Backspace => {
                buffer.pop();
            }
            _ => return,
        }
        self.needs_redraw = true;
    }

    /// Handle an action triggered by a keybinding.
    pub(super) fn handle_action(&mut self, action: Action) {
        debug!("Action {:?}", action);
        match action {
            Action::Undo => {
                self.abandon_gesture();
                if self.document_mut().undo() {
                    self.selected = None;
                    self.prune_image_cache();
                    self.needs_redraw = true;
                }
            }
            Action::Redo => {
                self.abandon_gesture();
                if self.document_mut().redo() {
                    self.selected = None;
                    self.prune_image_cache();
                    self.needs_redraw = true;
                }
            }
            Action::DeleteSelection => self.delete_selection(),
            Action::ToggleLock => self.toggle_lock(),
            Action::Cancel => {
                // Discard first: switching tools would commit an open text edit.
                self.abandon_gesture();
                self.set_tool(Tool::Select);
            }
            Action::ClearAll => {
                self.abandon_gesture();
                if self.document_mut().apply_and_commit(Edit::Clear) {
                    info!("Cleared all annotations");
                    self.prune_image_cache();
                }
                self.selected = None;
                self.needs_redraw = true;
            }
            Action::ZoomIn => self.zoom_in(),
            Action::ZoomOut => self.zoom_out(),
            Action::ZoomReset => self.set_zoom(1.0),
            Action::NewDocument => {
                self.new_document();
            }
            Action::CloseDocument => {
                let index = self.workspace.active_index();
                self.close_document(index);
            }
        }
    }

    /// Removes the selected primitive and commits.
    pub fn delete_selection(&mut self) {
        if !matches!(self.state, DrawingState::Idle) {
            return;
        }
        let Some(id) = self.selected.take() else {
            return;
        };
        if self.document_mut().apply_and_commit(Edit::Remove(id)) {
            debug!("Deleted selected primitive");
            self.prune_image_cache();
        }
        self.needs_redraw = true;
    }

    /// Flips the lock flag of the selected primitive and commits.
    pub fn toggle_lock(&mut self) {
        let Some(mut primitive) = self.selected().cloned() else {
            return;
        };
        primitive.locked = !primitive.locked;
        let locked = primitive.locked;
        if self.document_mut().apply_and_commit(Edit::Update(primitive)) {
            info!("Primitive {}", if locked { "locked" } else { "unlocked" });
            self.needs_redraw = true;
        }
    }
}
