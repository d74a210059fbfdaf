//! Configuration file support for pastemark.
//!
//! Settings are read from `~/.config/pastemark/config.toml`. They cover the
//! initial tool settings, the size of new documents, export naming and
//! session persistence. A missing file means defaults.

pub mod enums;
pub mod keybindings;
pub mod types;

pub use enums::{ColorSpec, HighlighterMode, SessionCompression, SessionStorageMode};
pub use keybindings::{Action, KeyBinding, KeybindingsConfig};
pub use types::{CanvasConfig, DrawingConfig, ExportConfig, SessionConfig};

use crate::document::MIN_CANVAS_SIZE;
use crate::draw::FontDescriptor;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const MIN_STROKE_WIDTH: f64 = 1.0;
const MAX_STROKE_WIDTH: f64 = 24.0;
const MIN_PIXEL_RATIO: f64 = 1.0;
const MAX_PIXEL_RATIO: f64 = 4.0;
const MAX_BATCH_DELAY_MS: u64 = 10_000;

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [drawing]
/// default_color = "blue"
/// default_stroke_width = 6
/// arrow_style = "outline"
///
/// [canvas]
/// default_width = 1280
/// default_height = 720
///
/// [export]
/// filename_template = "{title}_%Y%m%d"
///
/// [session]
/// compress = "on"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Initial tool settings
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Size of new documents
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// PNG export
    #[serde(default)]
    pub export: ExportConfig,

    /// Workspace persistence
    #[serde(default)]
    pub session: SessionConfig,

    /// Keyboard shortcuts
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl Config {
    /// Clamps out-of-range values, logging a warning for each.
    ///
    /// Validated ranges:
    /// - `default_stroke_width`: 1.0 - 24.0
    /// - `canvas.default_width` / `default_height`: at least 10
    /// - `export.pixel_ratio`: 1.0 - 4.0
    /// - `export.batch_delay_ms`: at most 10000
    fn validate_and_clamp(&mut self) {
        let width = self.drawing.default_stroke_width;
        if !(MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).contains(&width) {
            warn!(
                "Invalid default_stroke_width {:.1}, clamping to {:.0}-{:.0} range",
                width, MIN_STROKE_WIDTH, MAX_STROKE_WIDTH
            );
            self.drawing.default_stroke_width = if width.is_nan() {
                4.0
            } else {
                width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
            };
        }

        if self.canvas.default_width < MIN_CANVAS_SIZE {
            warn!(
                "Invalid canvas default_width {}, using {}",
                self.canvas.default_width, MIN_CANVAS_SIZE
            );
            self.canvas.default_width = MIN_CANVAS_SIZE;
        }

        if self.canvas.default_height < MIN_CANVAS_SIZE {
            warn!(
                "Invalid canvas default_height {}, using {}",
                self.canvas.default_height, MIN_CANVAS_SIZE
            );
            self.canvas.default_height = MIN_CANVAS_SIZE;
        }

        let ratio = self.export.pixel_ratio;
        if !(MIN_PIXEL_RATIO..=MAX_PIXEL_RATIO).contains(&ratio) {
            warn!(
                "Invalid export pixel_ratio {:.2}, clamping to {:.0}-{:.0} range",
                ratio, MIN_PIXEL_RATIO, MAX_PIXEL_RATIO
            );
            self.export.pixel_ratio = if ratio.is_nan() {
                1.0
            } else {
                ratio.clamp(MIN_PIXEL_RATIO, MAX_PIXEL_RATIO)
            };
        }

        if self.export.batch_delay_ms > MAX_BATCH_DELAY_MS {
            warn!(
                "Invalid export batch_delay_ms {}, clamping to {}",
                self.export.batch_delay_ms, MAX_BATCH_DELAY_MS
            );
            self.export.batch_delay_ms = MAX_BATCH_DELAY_MS;
        }

        if self.drawing.font_family.trim().is_empty() {
            warn!("Empty font_family, falling back to 'Sans'");
            self.drawing.font_family = "Sans".to_string();
        }

        if let Err(err) = self.keybindings.build_action_map() {
            warn!("Invalid keybindings ({}), using defaults", err);
            self.keybindings = KeybindingsConfig::default();
        }
    }

    /// Font for text primitives and stamp labels.
    pub fn font(&self) -> FontDescriptor {
        FontDescriptor {
            family: self.drawing.font_family.clone(),
            ..FontDescriptor::default()
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("pastemark");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default path, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from `path`.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the configuration to the default path.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    /// Serializes to TOML at `path`, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, config_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// JSON schema of the config file, pretty-printed.
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(Config);
        serde_json::to_string_pretty(&schema).context("Failed to serialize config schema")
    }
}
