//! Pointer picking: which primitive is under a point, and which handle of the
//! selected primitive.
//!
//! All tests run in the primitive's local frame. For rotated box variants
//! the query point is first rotated by `-rotation` about the box center,
//! which is equivalent to testing the rotated primitive directly.

use crate::draw::primitive::{Primitive, PrimitiveId, PrimitiveKind, StampStyle, stamp_radius};
use crate::draw::render::{diamond_path, triangle_path};
use crate::util::{Point, Rect, point_to_segment_distance, rotate_point};

/// Slack around box variants and ellipse radii.
pub const HIT_PADDING: f64 = 5.0;

/// Gap between a primitive's box and its selection outline / handles.
pub const SELECTION_PADDING: f64 = 4.0;

/// Edge of the square hotspot around each handle.
pub const HANDLE_HIT_SIZE: f64 = 12.0;

/// Edge of the drawn handle square.
pub const HANDLE_DRAW_SIZE: f64 = 8.0;

/// Distance of the rotation handle above the padded top edge.
pub const ROTATE_HANDLE_OFFSET: f64 = 20.0;

/// Minimum outline tolerance for triangle and diamond picking.
const POLYGON_STROKE_TOLERANCE: f64 = 10.0;

/// Resize/rotate hotspot on the selected primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Nw,
    Ne,
    Se,
    Sw,
    N,
    E,
    S,
    W,
    Rotate,
}

impl Handle {
    /// Hotspots in the order they are checked: corners, edges, rotate.
    pub const PRIORITY: [Handle; 9] = [
        Handle::Nw,
        Handle::Ne,
        Handle::Se,
        Handle::Sw,
        Handle::N,
        Handle::E,
        Handle::S,
        Handle::W,
        Handle::Rotate,
    ];

    pub fn is_corner(self) -> bool {
        matches!(self, Handle::Nw | Handle::Ne | Handle::Se | Handle::Sw)
    }

    /// Whether dragging this handle moves the left edge.
    pub fn moves_west(self) -> bool {
        matches!(self, Handle::Nw | Handle::Sw | Handle::W)
    }

    pub fn moves_east(self) -> bool {
        matches!(self, Handle::Ne | Handle::Se | Handle::E)
    }

    pub fn moves_north(self) -> bool {
        matches!(self, Handle::Nw | Handle::Ne | Handle::N)
    }

    pub fn moves_south(self) -> bool {
        matches!(self, Handle::Sw | Handle::Se | Handle::S)
    }
}

/// Maps a canvas point into the primitive's unrotated local frame.
pub fn to_local(primitive: &Primitive, point: Point) -> Point {
    let rotation = primitive.effective_rotation();
    if rotation == 0.0 {
        point
    } else {
        rotate_point(point, primitive.rotation_center(), -rotation)
    }
}

/// Returns the id of the topmost primitive under `point`.
pub fn hit_test(point: Point, primitives: &[Primitive]) -> Option<PrimitiveId> {
    hit_test_index(point, primitives).map(|i| primitives[i].id)
}

/// Like [`hit_test`] but returns the list index.
pub fn hit_test_index(point: Point, primitives: &[Primitive]) -> Option<usize> {
    primitives
        .iter()
        .rposition(|primitive| primitive_contains(primitive, point))
}

/// Per-variant containment test.
pub fn primitive_contains(primitive: &Primitive, point: Point) -> bool {
    let local = to_local(primitive, point);
    let stroke_width = primitive.stroke_width;

    match &primitive.kind {
        PrimitiveKind::Pen { points } | PrimitiveKind::Highlight { points } => {
            if points.is_empty() {
                return false;
            }
            primitive
                .bounding_box()
                .inflate(HIT_PADDING.max(stroke_width))
                .contains(local)
        }
        PrimitiveKind::Stamp { center, style, .. } => {
            let r = stamp_radius(stroke_width);
            let dx = point.x - center.x;
            let dy = point.y - center.y;
            match style {
                StampStyle::Circle => dx * dx + dy * dy <= r * r,
                StampStyle::Square => dx.abs() <= r && dy.abs() <= r,
            }
        }
        PrimitiveKind::Ellipse { bounds } => {
            let b = bounds.normalized();
            let c = b.center();
            let rx = b.width / 2.0 + HIT_PADDING;
            let ry = b.height / 2.0 + HIT_PADDING;
            let nx = (local.x - c.x) / rx;
            let ny = (local.y - c.y) / ry;
            nx * nx + ny * ny <= 1.0
        }
        PrimitiveKind::Line { bounds } => {
            let start = Point::new(bounds.x, bounds.y);
            let end = Point::new(bounds.right(), bounds.bottom());
            point_to_segment_distance(local, start, end) <= HIT_PADDING.max(stroke_width)
        }
        PrimitiveKind::Triangle { bounds } => {
            polygon_contains(local, stroke_width, |ctx| triangle_path(ctx, *bounds))
                .unwrap_or_else(|| bounds.normalized().contains(local))
        }
        PrimitiveKind::Diamond { bounds } => {
            polygon_contains(local, stroke_width, |ctx| diamond_path(ctx, *bounds))
                .unwrap_or_else(|| bounds.normalized().contains(local))
        }
        PrimitiveKind::HighlightRect { bounds }
        | PrimitiveKind::Rect { bounds }
        | PrimitiveKind::Arrow { bounds, .. }
        | PrimitiveKind::Text { bounds, .. }
        | PrimitiveKind::Pixelate { bounds, .. }
        | PrimitiveKind::Image { bounds, .. } => {
            bounds.normalized().inflate(HIT_PADDING).contains(local)
        }
    }
}

/// Fill-or-stroke containment on a closed path, using a throwaway 1x1 Cairo
/// surface for the path math. `None` if Cairo could not be set up.
fn polygon_contains(
    point: Point,
    stroke_width: f64,
    build: impl FnOnce(&cairo::Context),
) -> Option<bool> {
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1).ok()?;
    let ctx = cairo::Context::new(&surface).ok()?;
    build(&ctx);
    ctx.set_line_width(stroke_width.max(POLYGON_STROKE_TOLERANCE));
    let in_fill = ctx.in_fill(point.x, point.y).ok()?;
    let in_stroke = ctx.in_stroke(point.x, point.y).ok()?;
    Some(in_fill || in_stroke)
}

/// Handle centers for a (normalized, local-frame) bounding box, in
/// [`Handle::PRIORITY`] order.
pub fn handle_positions(bbox: &Rect) -> [(Handle, Point); 9] {
    let padded = bbox.normalized().inflate(SELECTION_PADDING);
    let left = padded.x;
    let right = padded.right();
    let top = padded.y;
    let bottom = padded.bottom();
    let mid_x = left + padded.width / 2.0;
    let mid_y = top + padded.height / 2.0;

    [
        (Handle::Nw, Point::new(left, top)),
        (Handle::Ne, Point::new(right, top)),
        (Handle::Se, Point::new(right, bottom)),
        (Handle::Sw, Point::new(left, bottom)),
        (Handle::N, Point::new(mid_x, top)),
        (Handle::E, Point::new(right, mid_y)),
        (Handle::S, Point::new(mid_x, bottom)),
        (Handle::W, Point::new(left, mid_y)),
        (Handle::Rotate, Point::new(mid_x, top - ROTATE_HANDLE_OFFSET)),
    ]
}

/// Returns the handle of `primitive` under `point`, if any.
///
/// Only unlocked box variants have handles.
pub fn resize_handle_at(point: Point, primitive: &Primitive) -> Option<Handle> {
    if !primitive.has_handles() {
        return None;
    }
    let local = to_local(primitive, point);
    let half = HANDLE_HIT_SIZE / 2.0;
    handle_positions(&primitive.bounding_box())
        .into_iter()
        .find(|(_, c)| (local.x - c.x).abs() <= half && (local.y - c.y).abs() <= half)
        .map(|(handle, _)| handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::RED;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn boxed(kind: fn(Rect) -> PrimitiveKind, x: f64, y: f64, w: f64, h: f64) -> Primitive {
        Primitive::new(kind(Rect::new(x, y, w, h)), RED, 4.0)
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Primitive {
        boxed(|bounds| PrimitiveKind::Rect { bounds }, x, y, w, h)
    }

    #[test]
    fn topmost_primitive_wins() {
        let bottom = rect(0.0, 0.0, 100.0, 100.0);
        let top = rect(50.0, 50.0, 100.0, 100.0);
        let top_id = top.id;
        let list = vec![bottom, top];
        assert_eq!(hit_test(Point::new(75.0, 75.0), &list), Some(top_id));
        assert_eq!(hit_test(Point::new(10.0, 10.0), &list), Some(list[0].id));
        assert_eq!(hit_test(Point::new(300.0, 300.0), &list), None);
    }

    #[test]
    fn box_hit_uses_padding() {
        let r = rect(10.0, 10.0, 20.0, 20.0);
        assert!(primitive_contains(&r, Point::new(6.0, 6.0)));
        assert!(!primitive_contains(&r, Point::new(4.0, 20.0)));
    }

    #[test]
    fn ellipse_excludes_box_corners() {
        let e = boxed(|bounds| PrimitiveKind::Ellipse { bounds }, 0.0, 0.0, 100.0, 50.0);
        assert!(primitive_contains(&e, Point::new(50.0, 25.0)));
        assert!(primitive_contains(&e, Point::new(-4.0, 25.0)));
        assert!(!primitive_contains(&e, Point::new(2.0, 2.0)));
    }

    #[test]
    fn line_hit_follows_segment() {
        let line = boxed(|bounds| PrimitiveKind::Line { bounds }, 100.0, 0.0, -100.0, 100.0);
        assert!(primitive_contains(&line, Point::new(50.0, 52.0)));
        assert!(!primitive_contains(&line, Point::new(10.0, 10.0)));
    }

    #[test]
    fn triangle_excludes_top_corners() {
        let tri = boxed(|bounds| PrimitiveKind::Triangle { bounds }, 0.0, 0.0, 100.0, 100.0);
        assert!(primitive_contains(&tri, Point::new(50.0, 70.0)));
        assert!(!primitive_contains(&tri, Point::new(3.0, 3.0)));
        // Outline tolerance near the slanted edge.
        assert!(primitive_contains(&tri, Point::new(22.0, 50.0)));
    }

    #[test]
    fn diamond_excludes_corners() {
        let d = boxed(|bounds| PrimitiveKind::Diamond { bounds }, 0.0, 0.0, 100.0, 100.0);
        assert!(primitive_contains(&d, Point::new(50.0, 50.0)));
        assert!(!primitive_contains(&d, Point::new(95.0, 95.0)));
    }

    #[test]
    fn stamp_hits_within_radius() {
        let stamp = Primitive::new(
            PrimitiveKind::Stamp {
                center: Point::new(50.0, 50.0),
                label: "1".into(),
                style: StampStyle::Circle,
            },
            RED,
            4.0,
        );
        assert!(primitive_contains(&stamp, Point::new(64.0, 50.0)));
        assert!(!primitive_contains(&stamp, Point::new(61.0, 61.0)));
    }

    #[test]
    fn freehand_uses_stroke_width_padding() {
        let mut pen = Primitive::new(
            PrimitiveKind::Pen {
                points: vec![Point::new(10.0, 10.0), Point::new(40.0, 40.0)],
            },
            RED,
            12.0,
        );
        assert!(primitive_contains(&pen, Point::new(0.0, 0.0)));
        pen.stroke_width = 2.0;
        assert!(!primitive_contains(&pen, Point::new(0.0, 0.0)));
        assert!(primitive_contains(&pen, Point::new(6.0, 6.0)));
    }

    #[test]
    fn quarter_turn_moves_footprint() {
        let mut r = rect(0.0, 0.0, 200.0, 100.0);
        r.rotation = FRAC_PI_2;
        // Rotated about (100, 50) the footprint is x 50..150, y -50..150.
        assert!(!primitive_contains(&r, Point::new(190.0, 10.0)));
        // The pivot is the centre, not the origin, so the lower-left corner
        // of an origin-pivoted footprint stays outside.
        assert!(!primitive_contains(&r, Point::new(10.0, 190.0)));
        assert!(primitive_contains(&r, Point::new(100.0, 145.0)));
        assert!(primitive_contains(&r, Point::new(60.0, -40.0)));
    }

    #[test]
    fn rotation_round_trip_matches_unrotated_test() {
        let base = rect(30.0, 40.0, 120.0, 60.0);
        let center = base.rotation_center();
        let probes = [
            Point::new(35.0, 45.0),
            Point::new(150.0, 100.0),
            Point::new(20.0, 20.0),
            Point::new(90.0, 70.0),
            Point::new(157.0, 70.0),
        ];
        for step in 0..12 {
            let theta = step as f64 * PI / 6.0;
            let mut rotated = base.clone();
            rotated.rotation = theta;
            for probe in probes {
                let forward = rotate_point(probe, center, theta);
                assert_eq!(
                    primitive_contains(&rotated, forward),
                    primitive_contains(&base, probe),
                    "theta={} probe={:?}",
                    theta,
                    probe
                );
            }
        }
    }

    #[test]
    fn handles_checked_corner_first() {
        let r = rect(0.0, 0.0, 100.0, 100.0);
        assert_eq!(resize_handle_at(Point::new(-4.0, -4.0), &r), Some(Handle::Nw));
        assert_eq!(resize_handle_at(Point::new(104.0, 50.0), &r), Some(Handle::E));
        assert_eq!(resize_handle_at(Point::new(50.0, -24.0), &r), Some(Handle::Rotate));
        assert_eq!(resize_handle_at(Point::new(50.0, 50.0), &r), None);

        // On a tiny box the corner beats the overlapping edge handle.
        let tiny = rect(0.0, 0.0, 2.0, 2.0);
        assert_eq!(resize_handle_at(Point::new(-3.0, -3.0), &tiny), Some(Handle::Nw));
    }

    #[test]
    fn handles_follow_rotation() {
        let mut r = rect(0.0, 0.0, 100.0, 100.0);
        r.rotation = PI;
        // Upside down: the rotate knob is now below the box.
        assert_eq!(resize_handle_at(Point::new(50.0, 124.0), &r), Some(Handle::Rotate));
        assert_eq!(resize_handle_at(Point::new(104.0, 104.0), &r), Some(Handle::Nw));
    }

    #[test]
    fn locked_and_freehand_have_no_handles() {
        let mut r = rect(0.0, 0.0, 100.0, 100.0);
        r.locked = true;
        assert_eq!(resize_handle_at(Point::new(-4.0, -4.0), &r), None);

        let pen = Primitive::new(
            PrimitiveKind::Pen {
                points: vec![Point::new(0.0, 0.0), Point::new(100.0, 100.0)],
            },
            RED,
            2.0,
        );
        assert_eq!(resize_handle_at(Point::new(-4.0, -4.0), &pen), None);
    }
}
