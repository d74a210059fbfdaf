//! Current tool settings (toolbar state).

use crate::config::{DrawingConfig, HighlighterMode};
use crate::draw::{ArrowStyle, Color, PixelateStyle, Primitive, PrimitiveKind, RED, StampStyle};

/// Style applied to newly drawn primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub color: Color,
    pub stroke_width: f64,
    pub arrow_style: ArrowStyle,
    pub stamp_style: StampStyle,
    pub pixelate_style: PixelateStyle,
    pub highlighter_mode: HighlighterMode,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: RED,
            stroke_width: 4.0,
            arrow_style: ArrowStyle::default(),
            stamp_style: StampStyle::default(),
            pixelate_style: PixelateStyle::default(),
            highlighter_mode: HighlighterMode::default(),
        }
    }
}

impl ToolSettings {
    pub fn from_config(config: &DrawingConfig) -> Self {
        Self {
            color: config.default_color.to_color(),
            stroke_width: config.default_stroke_width,
            arrow_style: config.arrow_style,
            stamp_style: config.stamp_style,
            pixelate_style: config.pixelate_style,
            highlighter_mode: config.highlighter_mode,
        }
    }

    /// Copy of `primitive` restyled with these settings.
    ///
    /// Color and stroke width always apply; variant styles only to the
    /// variant that has them. Image layers keep their own style.
    pub fn restyle(&self, primitive: &Primitive) -> Primitive {
        let mut updated = primitive.clone();
        if matches!(updated.kind, PrimitiveKind::Image { .. }) {
            return updated;
        }
        updated.color = self.color;
        updated.stroke_width = self.stroke_width;
        match &mut updated.kind {
            PrimitiveKind::Arrow { style, .. } => *style = self.arrow_style,
            PrimitiveKind::Stamp { style, .. } => *style = self.stamp_style,
            PrimitiveKind::Pixelate { style, .. } => *style = self.pixelate_style,
            _ => {}
        }
        updated
    }
}
