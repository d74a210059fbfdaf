//! Keybinding configuration types and parsing.
//!
//! Editor shortcuts are configurable per action; each action accepts several
//! bindings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // History
    Undo,
    Redo,

    // Selection
    DeleteSelection,
    ToggleLock,

    /// Back to the select tool, or discard an open text edit
    Cancel,
    ClearAll,

    // View
    ZoomIn,
    ZoomOut,
    ZoomReset,

    // Tabs
    NewDocument,
    CloseDocument,
}

/// A single keybinding: a key name with optional modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    /// Parse a keybinding string like "Ctrl+Shift+Z" or "Delete".
    ///
    /// Modifiers may appear in any order and spaces around '+' are ignored.
    /// "Ctrl++" binds the '+' key.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty keybinding string".to_string());
        }

        let normalized = s.replace(" + ", "+").replace("+ ", "+").replace(" +", "+");

        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        let mut key_parts = Vec::new();

        for part in normalized.split('+') {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "shift" => shift = true,
                "alt" => alt = true,
                _ => key_parts.push(part),
            }
        }

        if key_parts.is_empty() {
            return Err(format!("No key specified in: {}", s));
        }

        // A trailing "+" splits into empty parts; rejoining restores it.
        let key = match key_parts.join("+") {
            k if k.is_empty() => "+".to_string(),
            k => k,
        };

        Ok(Self {
            key,
            ctrl,
            shift,
            alt,
        })
    }

    /// Check if this keybinding matches the current input state.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == ctrl
            && self.shift == shift
            && self.alt == alt
    }
}

/// Configuration for all keybindings.
///
/// ```toml
/// [keybindings]
/// undo = ["Ctrl+Z"]
/// redo = ["Ctrl+Shift+Z", "Ctrl+Y"]
/// delete_selection = ["Delete", "Backspace"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeybindingsConfig {
    #[serde(default = "default_undo")]
    pub undo: Vec<String>,

    #[serde(default = "default_redo")]
    pub redo: Vec<String>,

    #[serde(default = "default_delete_selection")]
    pub delete_selection: Vec<String>,

    #[serde(default = "default_toggle_lock")]
    pub toggle_lock: Vec<String>,

    #[serde(default = "default_cancel")]
    pub cancel: Vec<String>,

    #[serde(default = "default_clear_all")]
    pub clear_all: Vec<String>,

    #[serde(default = "default_zoom_in")]
    pub zoom_in: Vec<String>,

    #[serde(default = "default_zoom_out")]
    pub zoom_out: Vec<String>,

    #[serde(default = "default_zoom_reset")]
    pub zoom_reset: Vec<String>,

    #[serde(default = "default_new_document")]
    pub new_document: Vec<String>,

    #[serde(default = "default_close_document")]
    pub close_document: Vec<String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            undo: default_undo(),
            redo: default_redo(),
            delete_selection: default_delete_selection(),
            toggle_lock: default_toggle_lock(),
            cancel: default_cancel(),
            clear_all: default_clear_all(),
            zoom_in: default_zoom_in(),
            zoom_out: default_zoom_out(),
            zoom_reset: default_zoom_reset(),
            new_document: default_new_document(),
            close_document: default_close_document(),
        }
    }
}

impl KeybindingsConfig {
    /// Build a lookup map from keybindings to actions.
    /// Returns an error if any keybinding string is invalid or if duplicates are detected.
    pub fn build_action_map(&self) -> Result<HashMap<KeyBinding, Action>, String> {
        let mut map = HashMap::new();

        let groups: [(&[String], Action); 11] = [
            (&self.undo, Action::Undo),
            (&self.redo, Action::Redo),
            (&self.delete_selection, Action::DeleteSelection),
            (&self.toggle_lock, Action::ToggleLock),
            (&self.cancel, Action::Cancel),
            (&self.clear_all, Action::ClearAll),
            (&self.zoom_in, Action::ZoomIn),
            (&self.zoom_out, Action::ZoomOut),
            (&self.zoom_reset, Action::ZoomReset),
            (&self.new_document, Action::NewDocument),
            (&self.close_document, Action::CloseDocument),
        ];

        for (bindings, action) in groups {
            for binding_str in bindings {
                let binding = KeyBinding::parse(binding_str)?;
                if let Some(existing) = map.insert(binding, action) {
                    return Err(format!(
                        "Duplicate keybinding '{}' assigned to both {:?} and {:?}",
                        binding_str, existing, action
                    ));
                }
            }
        }

        Ok(map)
    }
}

// =============================================================================
// Default keybinding functions
// =============================================================================

fn default_undo() -> Vec<String> {
    vec!["Ctrl+Z".to_string()]
}

fn default_redo() -> Vec<String> {
    vec!["Ctrl+Shift+Z".to_string(), "Ctrl+Y".to_string()]
}

fn default_delete_selection() -> Vec<String> {
    vec!["Delete".to_string(), "Backspace".to_string()]
}

fn default_toggle_lock() -> Vec<String> {
    vec!["Ctrl+L".to_string()]
}

fn default_cancel() -> Vec<String> {
    vec!["Escape".to_string()]
}

fn default_clear_all() -> Vec<String> {
    vec!["Ctrl+Shift+Delete".to_string()]
}

fn default_zoom_in() -> Vec<String> {
    vec!["Ctrl++".to_string(), "Ctrl+=".to_string()]
}

fn default_zoom_out() -> Vec<String> {
    vec!["Ctrl+-".to_string()]
}

fn default_zoom_reset() -> Vec<String> {
    vec!["Ctrl+0".to_string()]
}

fn default_new_document() -> Vec<String> {
    vec!["Ctrl+N".to_string()]
}

fn default_close_document() -> Vec<String> {
    vec!["Ctrl+W".to_string()]
}
