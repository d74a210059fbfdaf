//! Annotation primitives stored in a document.

use super::color::Color;
use super::raster::ImagePayload;
use crate::util::{self, Point, Rect};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Alpha applied to both highlighter modes regardless of the chosen color.
pub const HIGHLIGHT_ALPHA: f64 = 0.4;

/// Brush highlighter strokes are this many times wider than the stroke width.
pub const HIGHLIGHT_WIDTH_FACTOR: f64 = 3.0;

/// Text font size is the stroke width times this factor.
pub const TEXT_SIZE_FACTOR: f64 = 6.0;

/// Base stamp radius before the stroke width is added.
pub const STAMP_BASE_RADIUS: f64 = 10.0;

/// Stable identifier of a primitive for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimitiveId(Uuid);

impl PrimitiveId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PrimitiveId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arrowhead rendering style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStyle {
    /// Shaft stops at the head base; head is a filled triangle
    #[default]
    Filled,
    /// Full-length shaft with an open V head
    Outline,
}

/// Stamp badge shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StampStyle {
    #[default]
    Circle,
    Square,
}

/// Region effect applied by a pixelate primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PixelateStyle {
    /// Blocky mosaic
    #[default]
    Pixel,
    /// Gaussian blur
    Blur,
}

/// Geometry and variant-specific data of a primitive.
///
/// Box variants keep their raw `bounds`, which may carry negative width or
/// height: transiently while dragging, and permanently for lines and arrows
/// where the sign encodes direction (end = origin + size).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PrimitiveKind {
    /// Freehand pen stroke
    Pen { points: Vec<Point> },
    /// Freehand highlighter stroke (brush mode)
    Highlight { points: Vec<Point> },
    /// Highlighter rectangle (rect mode)
    HighlightRect { bounds: Rect },
    Rect { bounds: Rect },
    Ellipse { bounds: Rect },
    /// Isosceles triangle with the apex at top-center of the box
    Triangle { bounds: Rect },
    /// Rhombus through the box edge midpoints
    Diamond { bounds: Rect },
    Line { bounds: Rect },
    Arrow {
        bounds: Rect,
        #[serde(default)]
        style: ArrowStyle,
    },
    Text { bounds: Rect, text: String },
    /// Numbered badge centered on `center`
    Stamp {
        center: Point,
        label: String,
        #[serde(default)]
        style: StampStyle,
    },
    /// Region effect over already-composited pixels
    Pixelate {
        bounds: Rect,
        #[serde(default)]
        style: PixelateStyle,
    },
    /// Raster layer
    Image { bounds: Rect, payload: ImagePayload },
}

/// One annotation object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub id: PrimitiveId,
    pub color: Color,
    /// Line width; doubles as the size parameter for text and stamps
    pub stroke_width: f64,
    /// Radians about the box center; ignored by paths and stamps
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(flatten)]
    pub kind: PrimitiveKind,
}

impl Primitive {
    /// Creates an unlocked, unrotated primitive with a fresh id.
    pub fn new(kind: PrimitiveKind, color: Color, stroke_width: f64) -> Self {
        Self {
            id: PrimitiveId::new(),
            color,
            stroke_width,
            rotation: 0.0,
            locked: false,
            kind,
        }
    }

    /// Short name used in log messages.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            PrimitiveKind::Pen { .. } => "pen",
            PrimitiveKind::Highlight { .. } => "highlight",
            PrimitiveKind::HighlightRect { .. } => "highlight-rect",
            PrimitiveKind::Rect { .. } => "rect",
            PrimitiveKind::Ellipse { .. } => "ellipse",
            PrimitiveKind::Triangle { .. } => "triangle",
            PrimitiveKind::Diamond { .. } => "diamond",
            PrimitiveKind::Line { .. } => "line",
            PrimitiveKind::Arrow { .. } => "arrow",
            PrimitiveKind::Text { .. } => "text",
            PrimitiveKind::Stamp { .. } => "stamp",
            PrimitiveKind::Pixelate { .. } => "pixelate",
            PrimitiveKind::Image { .. } => "image",
        }
    }

    /// Raw box geometry for box variants.
    pub fn bounds(&self) -> Option<Rect> {
        match &self.kind {
            PrimitiveKind::HighlightRect { bounds }
            | PrimitiveKind::Rect { bounds }
            | PrimitiveKind::Ellipse { bounds }
            | PrimitiveKind::Triangle { bounds }
            | PrimitiveKind::Diamond { bounds }
            | PrimitiveKind::Line { bounds }
            | PrimitiveKind::Arrow { bounds, .. }
            | PrimitiveKind::Text { bounds, .. }
            | PrimitiveKind::Pixelate { bounds, .. }
            | PrimitiveKind::Image { bounds, .. } => Some(*bounds),
            PrimitiveKind::Pen { .. }
            | PrimitiveKind::Highlight { .. }
            | PrimitiveKind::Stamp { .. } => None,
        }
    }

    pub fn bounds_mut(&mut self) -> Option<&mut Rect> {
        match &mut self.kind {
            PrimitiveKind::HighlightRect { bounds }
            | PrimitiveKind::Rect { bounds }
            | PrimitiveKind::Ellipse { bounds }
            | PrimitiveKind::Triangle { bounds }
            | PrimitiveKind::Diamond { bounds }
            | PrimitiveKind::Line { bounds }
            | PrimitiveKind::Arrow { bounds, .. }
            | PrimitiveKind::Text { bounds, .. }
            | PrimitiveKind::Pixelate { bounds, .. }
            | PrimitiveKind::Image { bounds, .. } => Some(bounds),
            PrimitiveKind::Pen { .. }
            | PrimitiveKind::Highlight { .. }
            | PrimitiveKind::Stamp { .. } => None,
        }
    }

    /// True for variants whose geometry is a (pre-rotation) rectangle.
    pub fn is_box(&self) -> bool {
        self.bounds().is_some()
    }

    /// Line and arrow encode direction in the sign of width/height.
    pub fn is_direction_sensitive(&self) -> bool {
        matches!(
            self.kind,
            PrimitiveKind::Line { .. } | PrimitiveKind::Arrow { .. }
        )
    }

    /// Whether resize/rotate handles are offered: unlocked box variants only.
    pub fn has_handles(&self) -> bool {
        !self.locked && self.is_box()
    }

    /// Rotation that actually applies to rendering and hit-testing.
    pub fn effective_rotation(&self) -> f64 {
        if self.is_box() { self.rotation } else { 0.0 }
    }

    /// Axis-aligned extent in the primitive's local (unrotated) frame.
    ///
    /// Box variants return their normalized box, paths the extent of their
    /// points and stamps the square enclosing their badge. An empty path
    /// yields a zero-size rectangle at the origin.
    pub fn bounding_box(&self) -> Rect {
        match &self.kind {
            PrimitiveKind::Pen { points } | PrimitiveKind::Highlight { points } => {
                util::points_extent(points).unwrap_or_default()
            }
            PrimitiveKind::Stamp { center, .. } => {
                let r = stamp_radius(self.stroke_width);
                Rect::new(center.x - r, center.y - r, r * 2.0, r * 2.0)
            }
            _ => self.bounds().map(|b| b.normalized()).unwrap_or_default(),
        }
    }

    /// Pivot for rotation: the center of the normalized box.
    pub fn rotation_center(&self) -> Point {
        self.bounding_box().center()
    }

    /// Moves the primitive by `(dx, dy)`: every path point, the stamp
    /// anchor, or the box origin.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match &mut self.kind {
            PrimitiveKind::Pen { points } | PrimitiveKind::Highlight { points } => {
                for p in points.iter_mut() {
                    *p = p.offset(dx, dy);
                }
            }
            PrimitiveKind::Stamp { center, .. } => *center = center.offset(dx, dy),
            _ => {
                if let Some(bounds) = self.bounds_mut() {
                    *bounds = bounds.translate(dx, dy);
                }
            }
        }
    }

    /// Flips negative width/height into the origin, except for
    /// direction-sensitive variants which keep their sign.
    pub fn normalize(&mut self) {
        if self.is_direction_sensitive() {
            return;
        }
        if let Some(bounds) = self.bounds_mut() {
            *bounds = bounds.normalized();
        }
    }
}

/// Stamp badge radius for a given stroke width.
pub fn stamp_radius(stroke_width: f64) -> f64 {
    STAMP_BASE_RADIUS + stroke_width
}

/// Font size of text primitives for a given stroke width.
pub fn text_font_size(stroke_width: f64) -> f64 {
    stroke_width * TEXT_SIZE_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::RED;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Primitive {
        Primitive::new(
            PrimitiveKind::Rect {
                bounds: Rect::new(x, y, w, h),
            },
            RED,
            4.0,
        )
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(rect(0.0, 0.0, 1.0, 1.0).id, rect(0.0, 0.0, 1.0, 1.0).id);
    }

    #[test]
    fn normalize_is_idempotent_and_mirrors_positive_draw() {
        let mut dragged = rect(110.0, 60.0, -100.0, -50.0);
        dragged.normalize();
        let once = dragged.bounds();
        dragged.normalize();
        assert_eq!(dragged.bounds(), once);
        assert_eq!(once, Some(Rect::new(10.0, 10.0, 100.0, 50.0)));
    }

    #[test]
    fn lines_keep_their_direction() {
        let mut line = Primitive::new(
            PrimitiveKind::Line {
                bounds: Rect::new(100.0, 100.0, -50.0, -20.0),
            },
            RED,
            2.0,
        );
        line.normalize();
        assert_eq!(line.bounds(), Some(Rect::new(100.0, 100.0, -50.0, -20.0)));
        assert_eq!(line.bounding_box(), Rect::new(50.0, 80.0, 50.0, 20.0));
    }

    #[test]
    fn stamp_bounding_box_uses_radius() {
        let stamp = Primitive::new(
            PrimitiveKind::Stamp {
                center: Point::new(50.0, 50.0),
                label: "1".into(),
                style: StampStyle::Circle,
            },
            RED,
            4.0,
        );
        assert_eq!(stamp.bounding_box(), Rect::new(36.0, 36.0, 28.0, 28.0));
        assert!(!stamp.has_handles());
    }

    #[test]
    fn translate_moves_every_path_point() {
        let mut pen = Primitive::new(
            PrimitiveKind::Pen {
                points: vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)],
            },
            RED,
            2.0,
        );
        pen.translate(10.0, -2.0);
        let PrimitiveKind::Pen { points } = &pen.kind else {
            panic!("kind changed");
        };
        assert_eq!(points, &vec![Point::new(11.0, 0.0), Point::new(13.0, 2.0)]);
    }

    #[test]
    fn rotation_ignored_for_paths() {
        let mut pen = Primitive::new(PrimitiveKind::Pen { points: vec![] }, RED, 2.0);
        pen.rotation = 1.0;
        assert_eq!(pen.effective_rotation(), 0.0);
        assert_eq!(pen.bounding_box(), Rect::default());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(rect(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json["kind"], "rect");
        assert_eq!(json["bounds"]["width"], 3.0);
        let back: Primitive = serde_json::from_value(json).unwrap();
        assert_eq!(back.bounds(), Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
    }
}
