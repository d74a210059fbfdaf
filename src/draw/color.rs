//! RGBA color type and the editor palette.

use serde::{Deserialize, Serialize};

/// Represents an RGBA color with floating-point components.
///
/// All components are in the range 0.0 (minimum) to 1.0 (maximum).
///
/// # Examples
///
/// ```
/// use pastemark::draw::Color;
/// let red = Color { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
/// let translucent = red.with_alpha(0.4);
/// assert_eq!(translucent.a, 0.4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0.0 = no red, 1.0 = full red)
    pub r: f64,
    /// Green component (0.0 = no green, 1.0 = full green)
    pub g: f64,
    /// Blue component (0.0 = no blue, 1.0 = full blue)
    pub b: f64,
    /// Alpha/transparency (0.0 = fully transparent, 1.0 = fully opaque)
    pub a: f64,
}

impl Color {
    /// Creates a new color from RGBA components.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }

    /// Same color with alpha replaced.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Formats as `#rrggbb`, dropping alpha.
    pub fn to_hex(&self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    pub(crate) fn apply(&self, ctx: &cairo::Context) {
        ctx.set_source_rgba(self.r, self.g, self.b, self.a);
    }
}

// ============================================================================
// Palette
// ============================================================================

pub const BLACK: Color = Color::rgb8(0x00, 0x00, 0x00);
pub const WHITE: Color = Color::rgb8(0xff, 0xff, 0xff);
/// Default annotation color.
pub const RED: Color = Color::rgb8(0xef, 0x44, 0x44);
pub const ORANGE: Color = Color::rgb8(0xf9, 0x73, 0x16);
pub const YELLOW: Color = Color::rgb8(0xea, 0xb3, 0x08);
pub const GREEN: Color = Color::rgb8(0x22, 0xc5, 0x5e);
/// Also used for the selection outline of unlocked primitives.
pub const BLUE: Color = Color::rgb8(0x3b, 0x82, 0xf6);
pub const PURPLE: Color = Color::rgb8(0xa8, 0x55, 0xf7);

/// Swatches in toolbar order.
pub const PALETTE: [Color; 8] = [BLACK, WHITE, RED, ORANGE, YELLOW, GREEN, BLUE, PURPLE];

/// Stroke widths offered by the size picker.
pub const STROKE_WIDTHS: [f64; 6] = [2.0, 4.0, 6.0, 8.0, 12.0, 24.0];
