//! Configuration enum types.

use crate::draw::{Color, RED};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - either a named color or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// default_color = "red"
///
/// # Hex
/// default_color = "#3b82f6"
///
/// # Custom RGB color (0-255 per component)
/// default_color = [255, 128, 0]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Palette name (black, white, red, orange, yellow, green, blue, purple) or hex string
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`].
    ///
    /// Names go through `util::name_to_color()`, then hex parsing. Unknown
    /// values fall back to red with a warning.
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Name(name) => crate::util::name_to_color(name)
                .or_else(|| crate::util::parse_hex_color(name))
                .unwrap_or_else(|| {
                    warn!("Unknown color '{}', using red", name);
                    RED
                }),
            ColorSpec::Rgb([r, g, b]) => Color::rgb8(*r, *g, *b),
        }
    }
}

/// How the highlighter tool lays down ink.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum HighlighterMode {
    /// Freehand translucent stroke
    #[default]
    Brush,
    /// Translucent filled rectangle
    Rect,
}

/// Compression preference for session files.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SessionCompression {
    /// Always write plain JSON
    Off,
    /// Always gzip
    On,
    /// Gzip once the payload exceeds the threshold
    #[default]
    Auto,
}

/// Where session files are stored.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStorageMode {
    /// `$XDG_DATA_HOME/pastemark`
    #[default]
    Auto,
    /// Next to the config file
    Config,
    /// `session.custom_directory`
    Custom,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::BLUE;

    #[test]
    fn color_spec_accepts_names_hex_and_rgb() {
        assert_eq!(ColorSpec::Name("blue".into()).to_color(), BLUE);
        assert_eq!(ColorSpec::Name("#3b82f6".into()).to_color(), BLUE);
        assert_eq!(ColorSpec::Rgb([0x3b, 0x82, 0xf6]).to_color(), BLUE);
        assert_eq!(ColorSpec::Name("mauve-ish".into()).to_color(), RED);
    }
}
