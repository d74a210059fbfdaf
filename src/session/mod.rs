//! Session persistence (save/restore) support.
//!
//! Converts the open documents into a serialised representation, writes it to
//! disk with locking and optional compression, and rebuilds the workspace on
//! startup.

mod options;
mod snapshot;

pub use options::{
    CompressionMode, DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES, SessionOptions, options_from_config,
};
pub use snapshot::{
    SavedDocument, SessionSnapshot, clear_session, load_snapshot, restore_workspace,
    save_snapshot, snapshot_from_workspace,
};
