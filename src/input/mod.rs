//! Input handling and tool state machine.
//!
//! This module translates host keyboard and pointer events into document
//! edits. It owns the current tool and its settings, the selection, and the
//! gesture state machine (idle, drawing, dragging, resizing, rotating, text
//! editing).

pub mod events;
pub mod modifiers;
pub mod settings;
pub mod state;
pub mod tool;

// Re-export commonly used types at module level
pub use events::{CursorHint, Key, MouseButton};
pub use modifiers::Modifiers;
pub use settings::ToolSettings;
pub use state::{ClipboardContent, ClipboardError, Draft, DrawingState, InputState};
pub use tool::Tool;
