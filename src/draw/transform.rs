//! Coordinate spaces.
//!
//! Three spaces are involved when drawing and picking:
//! - **screen**: pointer positions as delivered by the host, already scaled by
//!   the view zoom
//! - **canvas**: logical document pixels, where primitives live
//! - **device**: backing-surface pixels (`canvas * view_scale * pixel_ratio`)
//!
//! Every conversion goes through [`ViewTransform`].

use crate::util::{Point, Rect};

pub const MIN_VIEW_SCALE: f64 = 0.1;
pub const MAX_VIEW_SCALE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// User zoom factor
    pub view_scale: f64,
    /// Host device pixel ratio (HiDPI)
    pub pixel_ratio: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    pub const fn identity() -> Self {
        Self {
            view_scale: 1.0,
            pixel_ratio: 1.0,
        }
    }

    /// Builds a transform with the zoom clamped to the supported range.
    pub fn new(view_scale: f64, pixel_ratio: f64) -> Self {
        Self {
            view_scale: clamp_view_scale(view_scale),
            pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
        }
    }

    /// Canvas units to device pixels.
    pub fn device_scale(&self) -> f64 {
        self.view_scale * self.pixel_ratio
    }

    pub fn screen_to_canvas(&self, x: f64, y: f64) -> Point {
        Point::new(x / self.view_scale, y / self.view_scale)
    }

    /// Converts a screen-space distance to canvas units.
    pub fn screen_delta_to_canvas(&self, d: f64) -> f64 {
        d / self.view_scale
    }

    pub fn canvas_to_device(&self, p: Point) -> Point {
        let s = self.device_scale();
        Point::new(p.x * s, p.y * s)
    }

    /// Backing-surface size for a canvas, rounded up to whole pixels.
    pub fn device_size(&self, canvas_width: u32, canvas_height: u32) -> (i32, i32) {
        let s = self.device_scale();
        (
            (canvas_width as f64 * s).ceil().max(1.0) as i32,
            (canvas_height as f64 * s).ceil().max(1.0) as i32,
        )
    }

    /// Installs canvas-to-device scaling on a context.
    pub fn apply(&self, ctx: &cairo::Context) {
        let s = self.device_scale();
        ctx.scale(s, s);
    }
}

pub fn clamp_view_scale(scale: f64) -> f64 {
    if scale.is_finite() {
        scale.clamp(MIN_VIEW_SCALE, MAX_VIEW_SCALE)
    } else {
        1.0
    }
}

/// Integer device-pixel rectangle covering a user-space rect under the
/// context's current matrix (rotation included), clipped to the target size.
///
/// Returns `None` when the covered area is empty.
pub fn device_bounds(
    ctx: &cairo::Context,
    rect: Rect,
    target_width: i32,
    target_height: i32,
) -> Option<(i32, i32, i32, i32)> {
    let r = rect.normalized();
    let corners = [
        (r.x, r.y),
        (r.right(), r.y),
        (r.right(), r.bottom()),
        (r.x, r.bottom()),
    ];
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (x, y) in corners {
        let (dx, dy) = ctx.user_to_device(x, y);
        min_x = min_x.min(dx);
        min_y = min_y.min(dy);
        max_x = max_x.max(dx);
        max_y = max_y.max(dy);
    }

    let x0 = (min_x.floor() as i32).max(0);
    let y0 = (min_y.floor() as i32).max(0);
    let x1 = (max_x.ceil() as i32).min(target_width);
    let y1 = (max_y.ceil() as i32).min(target_height);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0, y0, x1 - x0, y1 - y0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_points_divide_by_zoom_only() {
        let t = ViewTransform::new(2.0, 1.5);
        assert_eq!(t.screen_to_canvas(100.0, 40.0), Point::new(50.0, 20.0));
        assert_eq!(t.device_scale(), 3.0);
        assert_eq!(t.canvas_to_device(Point::new(1.0, 2.0)), Point::new(3.0, 6.0));
    }

    #[test]
    fn zoom_is_clamped() {
        assert_eq!(ViewTransform::new(0.01, 1.0).view_scale, MIN_VIEW_SCALE);
        assert_eq!(ViewTransform::new(9.0, 1.0).view_scale, MAX_VIEW_SCALE);
        assert_eq!(clamp_view_scale(f64::NAN), 1.0);
    }

    #[test]
    fn device_size_rounds_up() {
        let t = ViewTransform::new(1.0, 1.25);
        assert_eq!(t.device_size(801, 600), (1002, 750));
    }

    #[test]
    fn device_bounds_follow_context_matrix() {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 100, 100).unwrap();
        let ctx = cairo::Context::new(&surface).unwrap();
        ctx.scale(2.0, 2.0);
        let bounds = device_bounds(&ctx, Rect::new(10.0, 10.0, 20.0, -5.0), 100, 100);
        assert_eq!(bounds, Some((20, 10, 40, 10)));
        assert!(device_bounds(&ctx, Rect::new(60.0, 0.0, 5.0, 5.0), 100, 100).is_none());
    }
}
