use super::options::{CompressionMode, SessionOptions};
use crate::document::{Document, DocumentSnapshot, Workspace};
use anyhow::{Context, Result};
use chrono::Utc;
use flate2::{Compression, bufread::GzDecoder, write::GzEncoder};
use fs2::FileExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const CURRENT_VERSION: u32 = 1;

/// One persisted tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDocument {
    pub title: String,
    #[serde(flatten)]
    pub snapshot: DocumentSnapshot,
}

/// Captured workspace suitable for serialisation or restoration.
///
/// History, selection and zoom are not part of it; restored documents start
/// with a single history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub documents: Vec<SavedDocument>,
    pub active: usize,
    pub next_number: u32,
}

impl SessionSnapshot {
    fn is_empty(&self) -> bool {
        self.documents
            .iter()
            .all(|doc| doc.snapshot.primitives.is_empty() && doc.snapshot.background.is_none())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    last_modified: String,
    #[serde(default)]
    active: usize,
    #[serde(default = "default_next_number")]
    next_number: u32,
    #[serde(default)]
    documents: Vec<SavedDocument>,
}

fn default_next_number() -> u32 {
    1
}

/// Capture every open document of `workspace`.
pub fn snapshot_from_workspace(workspace: &Workspace) -> SessionSnapshot {
    SessionSnapshot {
        documents: workspace
            .documents()
            .iter()
            .map(|doc| SavedDocument {
                title: doc.title().to_string(),
                snapshot: doc.snapshot(),
            })
            .collect(),
        active: workspace.active_index(),
        next_number: workspace.next_number(),
    }
}

/// Rebuild a workspace from a snapshot. New blank tabs get the given size.
pub fn restore_workspace(snapshot: SessionSnapshot, canvas_width: u32, canvas_height: u32) -> Workspace {
    let documents = snapshot
        .documents
        .into_iter()
        .map(|saved| Document::from_snapshot(saved.title, saved.snapshot))
        .collect();
    Workspace::from_documents(
        documents,
        snapshot.active,
        snapshot.next_number,
        canvas_width,
        canvas_height,
    )
}

/// Persist the provided snapshot to disk according to the configured options.
///
/// An empty workspace removes any previous session file instead.
pub fn save_snapshot(snapshot: &SessionSnapshot, options: &SessionOptions) -> Result<()> {
    if !options.enabled {
        debug!("Session persistence disabled; skipping save");
        return Ok(());
    }

    fs::create_dir_all(&options.base_dir).with_context(|| {
        format!(
            "failed to create session directory {}",
            options.base_dir.display()
        )
    })?;

    let lock_path = options.lock_file_path();
    let lock_file = open_lock_file(&lock_path)?;
    lock_file
        .lock_exclusive()
        .with_context(|| format!("failed to lock session file {}", lock_path.display()))?;

    let result = save_snapshot_inner(snapshot, options);

    lock_file.unlock().unwrap_or_else(|err| {
        warn!(
            "failed to unlock session file {}: {}",
            lock_path.display(),
            err
        )
    });

    result
}

fn save_snapshot_inner(snapshot: &SessionSnapshot, options: &SessionOptions) -> Result<()> {
    let session_path = options.session_file_path();

    if snapshot.is_empty() {
        if session_path.exists() {
            debug!(
                "Removing session file {} because the workspace is empty",
                session_path.display()
            );
            fs::remove_file(&session_path).with_context(|| {
                format!(
                    "failed to remove empty session file {}",
                    session_path.display()
                )
            })?;
        }
        return Ok(());
    }

    let file_payload = SessionFile {
        version: CURRENT_VERSION,
        last_modified: Utc::now().to_rfc3339(),
        active: snapshot.active,
        next_number: snapshot.next_number,
        documents: snapshot.documents.clone(),
    };

    let mut json_bytes =
        serde_json::to_vec_pretty(&file_payload).context("failed to serialise session payload")?;

    let should_compress = match options.compression {
        CompressionMode::Off => false,
        CompressionMode::On => true,
        CompressionMode::Auto => (json_bytes.len() as u64) >= options.auto_compress_threshold_bytes,
    };

    if should_compress {
        json_bytes = compress_bytes(&json_bytes)?;
    }

    if json_bytes.len() as u64 > options.max_file_size_bytes {
        warn!(
            "Session data size {} bytes exceeds the configured limit of {} bytes; skipping save",
            json_bytes.len(),
            options.max_file_size_bytes
        );
        return Ok(());
    }

    let tmp_path = temp_path(&session_path);
    {
        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .with_context(|| {
                format!(
                    "failed to open temporary session file {}",
                    tmp_path.display()
                )
            })?;
        tmp_file
            .write_all(&json_bytes)
            .context("failed to write session payload")?;
        tmp_file
            .sync_all()
            .context("failed to sync temporary session file")?;
    }

    fs::rename(&tmp_path, &session_path).with_context(|| {
        format!(
            "failed to move temporary session file {} -> {}",
            tmp_path.display(),
            session_path.display()
        )
    })?;

    info!(
        "Session saved to {} ({} documents, {} bytes, compression={})",
        session_path.display(),
        snapshot.documents.len(),
        json_bytes.len(),
        should_compress
    );

    Ok(())
}

/// Attempt to load a previously saved session.
pub fn load_snapshot(options: &SessionOptions) -> Result<Option<SessionSnapshot>> {
    if !options.enabled {
        debug!("Session persistence disabled; skipping load");
        return Ok(None);
    }

    let session_path = options.session_file_path();
    if !session_path.exists() {
        debug!(
            "No session file present at {}, skipping load",
            session_path.display()
        );
        return Ok(None);
    }

    let metadata = fs::metadata(&session_path)
        .with_context(|| format!("failed to stat session file {}", session_path.display()))?;
    if metadata.len() > options.max_file_size_bytes {
        warn!(
            "Session file {} is {} bytes which exceeds the configured limit ({} bytes); refusing to load",
            session_path.display(),
            metadata.len(),
            options.max_file_size_bytes
        );
        return Ok(None);
    }

    let lock_path = options.lock_file_path();
    let lock_file = open_lock_file(&lock_path)?;
    lock_file
        .lock_shared()
        .with_context(|| format!("failed to acquire shared lock {}", lock_path.display()))?;

    let result = load_snapshot_inner(&session_path);

    lock_file.unlock().unwrap_or_else(|err| {
        warn!(
            "failed to unlock session file {}: {}",
            lock_path.display(),
            err
        )
    });

    result
}

fn load_snapshot_inner(session_path: &Path) -> Result<Option<SessionSnapshot>> {
    let mut file_bytes = Vec::new();
    File::open(session_path)
        .with_context(|| format!("failed to open session file {}", session_path.display()))?
        .read_to_end(&mut file_bytes)
        .context("failed to read session file")?;

    let decompressed = if is_gzip(&file_bytes) {
        let mut decoder = GzDecoder::new(&file_bytes[..]);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .context("failed to decompress session file")?;
        out
    } else {
        file_bytes
    };

    let session_file: SessionFile =
        serde_json::from_slice(&decompressed).context("failed to parse session json")?;

    if session_file.version > CURRENT_VERSION {
        warn!(
            "Session file {} has version {} (newer than {}); loading what is understood",
            session_path.display(),
            session_file.version,
            CURRENT_VERSION
        );
    }

    let snapshot = SessionSnapshot {
        documents: session_file.documents,
        active: session_file.active,
        next_number: session_file.next_number,
    };

    if snapshot.documents.is_empty() {
        debug!(
            "Loaded session file at {} but it contained no documents",
            session_path.display()
        );
        return Ok(None);
    }

    info!(
        "Restored {} document(s) from {}",
        snapshot.documents.len(),
        session_path.display()
    );
    Ok(Some(snapshot))
}

/// Remove the session file and its lock. Returns whether a session existed.
pub fn clear_session(options: &SessionOptions) -> Result<bool> {
    let removed = remove_file_if_exists(&options.session_file_path())?;
    remove_file_if_exists(&options.lock_file_path())?;
    Ok(removed)
}

fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
    }
}

fn open_lock_file(lock_path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .with_context(|| format!("failed to open session lock file {}", lock_path.display()))
}

fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .context("failed to compress session payload")?;
    encoder
        .finish()
        .context("failed to finalise compressed session payload")
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() > 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

fn temp_path(target: &Path) -> PathBuf {
    let mut candidate = target.with_extension("json.tmp");
    let mut counter = 0u32;
    while candidate.exists() {
        counter += 1;
        candidate = target.with_extension(format!("json.tmp{}", counter));
    }
    candidate
}
