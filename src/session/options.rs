use crate::config::{SessionCompression, SessionConfig, SessionStorageMode};
use crate::util::expand_tilde;
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};

pub const DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES: u64 = 100 * 1024; // 100 KiB

const SESSION_FILE_STEM: &str = "workspace";

/// Compression preference for session files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// Always write plain JSON.
    Off,
    /// Always write gzip-compressed JSON.
    On,
    /// Write gzip when payload exceeds the configured threshold.
    Auto,
}

impl From<SessionCompression> for CompressionMode {
    fn from(value: SessionCompression) -> Self {
        match value {
            SessionCompression::Auto => CompressionMode::Auto,
            SessionCompression::On => CompressionMode::On,
            SessionCompression::Off => CompressionMode::Off,
        }
    }
}

/// Runtime options derived from configuration for session persistence.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub base_dir: PathBuf,
    pub enabled: bool,
    pub max_file_size_bytes: u64,
    pub compression: CompressionMode,
    pub auto_compress_threshold_bytes: u64,
}

impl SessionOptions {
    /// Creates an enabled options struct with sensible defaults. Intended mainly for tests.
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            enabled: true,
            max_file_size_bytes: 64 * 1024 * 1024,
            compression: CompressionMode::Auto,
            auto_compress_threshold_bytes: DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES,
        }
    }

    pub fn session_file_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.json", SESSION_FILE_STEM))
    }

    pub fn lock_file_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.lock", SESSION_FILE_STEM))
    }
}

/// Build runtime session options from configuration values.
pub fn options_from_config(session_cfg: &SessionConfig, config_dir: &Path) -> Result<SessionOptions> {
    let base_dir = match session_cfg.storage {
        SessionStorageMode::Auto => {
            let root = dirs::data_dir().unwrap_or_else(|| config_dir.to_path_buf());
            root.join("pastemark")
        }
        SessionStorageMode::Config => config_dir.to_path_buf(),
        SessionStorageMode::Custom => {
            let raw = session_cfg.custom_directory.as_ref().ok_or_else(|| {
                anyhow!("session.custom_directory must be set when storage = \"custom\"")
            })?;
            let expanded = expand_tilde(raw);
            if expanded.as_os_str().is_empty() {
                return Err(anyhow!("session.custom_directory resolved to an empty path"));
            }
            expanded
        }
    };

    let mut options = SessionOptions::new(base_dir);
    options.enabled = session_cfg.enabled;
    options.max_file_size_bytes = session_cfg.max_file_size_bytes.max(1);
    options.auto_compress_threshold_bytes = session_cfg.auto_compress_threshold_bytes.max(1);
    options.compression = session_cfg.compress.into();
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_storage_requires_directory() {
        let cfg = SessionConfig {
            storage: SessionStorageMode::Custom,
            custom_directory: None,
            ..SessionConfig::default()
        };
        assert!(options_from_config(&cfg, Path::new("/tmp/cfg")).is_err());

        let cfg = SessionConfig {
            storage: SessionStorageMode::Custom,
            custom_directory: Some("/tmp/sessions".into()),
            compress: SessionCompression::On,
            ..SessionConfig::default()
        };
        let options = options_from_config(&cfg, Path::new("/tmp/cfg")).unwrap();
        assert_eq!(options.base_dir, PathBuf::from("/tmp/sessions"));
        assert_eq!(options.compression, CompressionMode::On);
        assert_eq!(
            options.session_file_path(),
            PathBuf::from("/tmp/sessions/workspace.json")
        );
    }

    #[test]
    fn config_storage_uses_config_dir() {
        let cfg = SessionConfig {
            storage: SessionStorageMode::Config,
            ..SessionConfig::default()
        };
        let options = options_from_config(&cfg, Path::new("/tmp/cfg")).unwrap();
        assert_eq!(options.base_dir, PathBuf::from("/tmp/cfg"));
        assert!(options.enabled);
    }
}
