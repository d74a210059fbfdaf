mod actions;
mod clipboard;
mod core;
mod files;
mod mouse;
mod render;

pub use clipboard::{ClipboardContent, ClipboardError, PASTED_TITLE};
pub use core::{Draft, DrawingState, InputState, ZOOM_STEP};
pub use mouse::{MIN_SHAPE_SIZE, MIN_TEXT_BOX_SIZE};
