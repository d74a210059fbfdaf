//! Scene model, renderer and interaction engine of an image annotation editor.
//!
//! A [`Document`] holds annotation primitives (strokes, shapes, arrows, text,
//! stamps, pixelate/blur regions, image layers) over an optional raster
//! background, with snapshot-based undo/redo. [`InputState`] turns pointer and
//! keyboard events into document edits, and [`draw::render_scene`] paints the
//! result onto a Cairo context. Hosts own the window, the clipboard and the
//! event loop.

pub mod config;
pub mod document;
pub mod draw;
pub mod export;
pub mod hit_test;
pub mod input;
pub mod notification;
pub mod session;
pub mod util;

pub use config::Config;
pub use document::{Document, Edit, Workspace};
pub use input::InputState;
