//! Configuration type definitions.

use super::enums::{ColorSpec, HighlighterMode, SessionCompression, SessionStorageMode};
use crate::draw::{ArrowStyle, PixelateStyle, StampStyle};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Drawing-related settings.
///
/// Initial tool settings of a fresh editor. Users change them at runtime from
/// the toolbar; changes made while a primitive is selected apply to it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Default ink color - a palette name (black, white, red, orange, yellow, green,
    /// blue, purple), a hex string, or an RGB array like `[239, 68, 68]`
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Default stroke width in pixels (valid range: 1.0 - 24.0).
    /// Text font size is six times this; stamp radius is ten plus this.
    #[serde(default = "default_stroke_width")]
    pub default_stroke_width: f64,

    /// Arrowhead style: `filled` or `outline`
    #[serde(default)]
    pub arrow_style: ArrowStyle,

    /// Stamp badge shape: `circle` or `square`
    #[serde(default)]
    pub stamp_style: StampStyle,

    /// Region effect: `pixel` or `blur`
    #[serde(default)]
    pub pixelate_style: PixelateStyle,

    /// Highlighter behavior: `brush` (freehand) or `rect`
    #[serde(default)]
    pub highlighter_mode: HighlighterMode,

    /// Font family for text primitives and stamp labels (e.g., "Sans", "Inter")
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            default_stroke_width: default_stroke_width(),
            arrow_style: ArrowStyle::default(),
            stamp_style: StampStyle::default(),
            pixelate_style: PixelateStyle::default(),
            highlighter_mode: HighlighterMode::default(),
            font_family: default_font_family(),
        }
    }
}

/// Size of newly opened documents.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CanvasConfig {
    /// Width in canvas pixels (minimum 10)
    #[serde(default = "default_canvas_width")]
    pub default_width: u32,

    /// Height in canvas pixels (minimum 10)
    #[serde(default = "default_canvas_height")]
    pub default_height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_width: default_canvas_width(),
            default_height: default_canvas_height(),
        }
    }
}

/// PNG export settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportConfig {
    /// Directory exports are written to. Supports `~/`.
    #[serde(default = "default_save_directory")]
    pub save_directory: String,

    /// File name without extension. `{title}` expands to the document title,
    /// the rest goes through chrono formatting (e.g. `%Y-%m-%d_%H%M%S`).
    #[serde(default = "default_filename_template")]
    pub filename_template: String,

    /// Pause between documents during "save all", in milliseconds
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Device pixels per canvas pixel in exported files (valid range: 1.0 - 4.0)
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            save_directory: default_save_directory(),
            filename_template: default_filename_template(),
            batch_delay_ms: default_batch_delay_ms(),
            pixel_ratio: default_pixel_ratio(),
        }
    }
}

/// Workspace persistence between runs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionConfig {
    /// Save open documents on exit and restore them on start
    #[serde(default = "default_session_enabled")]
    pub enabled: bool,

    /// Gzip the session file: `off`, `on` or `auto`
    #[serde(default)]
    pub compress: SessionCompression,

    /// Payload size above which `auto` compresses, in bytes
    #[serde(default = "default_auto_compress_threshold_bytes")]
    pub auto_compress_threshold_bytes: u64,

    /// Session files larger than this are not written or loaded
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// Where session files live: `auto`, `config` or `custom`
    #[serde(default)]
    pub storage: SessionStorageMode,

    /// Directory used when `storage = "custom"`
    #[serde(default)]
    pub custom_directory: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: default_session_enabled(),
            compress: SessionCompression::default(),
            auto_compress_threshold_bytes: default_auto_compress_threshold_bytes(),
            max_file_size_bytes: default_max_file_size_bytes(),
            storage: SessionStorageMode::default(),
            custom_directory: None,
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_color() -> ColorSpec {
    ColorSpec::Name("red".to_string())
}

fn default_stroke_width() -> f64 {
    4.0
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_canvas_width() -> u32 {
    crate::document::DEFAULT_CANVAS_WIDTH
}

fn default_canvas_height() -> u32 {
    crate::document::DEFAULT_CANVAS_HEIGHT
}

fn default_save_directory() -> String {
    "~/Pictures/Pastemark".to_string()
}

fn default_filename_template() -> String {
    "{title}_%Y-%m-%d_%H%M%S".to_string()
}

fn default_batch_delay_ms() -> u64 {
    250
}

fn default_pixel_ratio() -> f64 {
    1.0
}

fn default_session_enabled() -> bool {
    true
}

fn default_auto_compress_threshold_bytes() -> u64 {
    100 * 1024
}

fn default_max_file_size_bytes() -> u64 {
    64 * 1024 * 1024
}
