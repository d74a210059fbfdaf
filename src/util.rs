//! Geometry helpers and color lookups shared by the renderer and hit-tester.
//!
//! This module provides:
//! - [`Point`] and [`Rect`] in logical canvas pixels
//! - Rotation, segment distance and arrowhead calculations
//! - Name/hex to color mapping used by configuration and the palette

use crate::draw::{Color, color::*};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Points and Rectangles
// ============================================================================

/// A position in logical canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance_to(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Box geometry as stored on primitives.
///
/// Width and height may be negative while a drag is in progress (and stay
/// negative for direction-dependent primitives such as lines and arrows).
/// Use [`Rect::normalized`] whenever an axis-aligned extent is needed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shifts the origin so width and height are non-negative.
    pub fn normalized(&self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self::new(x, y, width, height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment test. Expects a normalized rectangle.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Grows the rectangle by `amount` on every side.
    pub fn inflate(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// AABB overlap test (touching edges count as overlapping).
    pub fn intersects(&self, other: &Rect) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        a.x <= b.right() && b.x <= a.right() && a.y <= b.bottom() && b.y <= a.bottom()
    }

    /// True when either dimension is smaller than `min` (after normalization).
    pub fn is_smaller_than(&self, min: f64) -> bool {
        self.width.abs() < min || self.height.abs() < min
    }
}

// ============================================================================
// Transforms and Distances
// ============================================================================

/// Rotates `p` around `center` by `angle` radians.
///
/// Canvas space has y pointing down, so positive angles turn clockwise on
/// screen. Pass `-angle` to map a pointer into a rotated primitive's local frame.
pub fn rotate_point(p: Point, center: Point, angle: f64) -> Point {
    if angle == 0.0 {
        return p;
    }
    let (sin_a, cos_a) = angle.sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(
        center.x + dx * cos_a - dy * sin_a,
        center.y + dx * sin_a + dy * cos_a,
    )
}

/// Distance from `p` to the closest point of segment `a`–`b`.
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Min/max extent over a point list, or `None` when empty.
pub fn points_extent(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

// ============================================================================
// Arrowhead Geometry
// ============================================================================

/// Half-angle between the shaft and each side of the head.
pub const ARROW_HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;

/// Computed arrowhead corners for an arrow running from `start` to `tip`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
    /// Where a filled head meets the shaft (tip minus head length along the shaft).
    pub base: Point,
    pub length: f64,
}

/// Head length for a given stroke width before clamping to the shaft.
pub fn arrow_head_length(stroke_width: f64) -> f64 {
    15.0 + stroke_width * 2.0
}

/// Calculates the arrowhead for a shaft from `start` to `tip`.
///
/// The head length scales with `stroke_width` but never exceeds the shaft
/// length, so short arrows get a proportionally smaller head.
/// A zero-length shaft yields a degenerate head collapsed onto the tip.
pub fn calculate_arrowhead(start: Point, tip: Point, stroke_width: f64) -> ArrowHead {
    let shaft = start.distance_to(tip);
    let length = arrow_head_length(stroke_width).min(shaft);
    if shaft < f64::EPSILON {
        return ArrowHead {
            tip,
            left: tip,
            right: tip,
            base: tip,
            length: 0.0,
        };
    }

    let angle = (tip.y - start.y).atan2(tip.x - start.x);
    let corner = |offset: f64| {
        Point::new(
            tip.x - length * (angle + offset).cos(),
            tip.y - length * (angle + offset).sin(),
        )
    };

    ArrowHead {
        tip,
        left: corner(-ARROW_HEAD_ANGLE),
        right: corner(ARROW_HEAD_ANGLE),
        base: Point::new(tip.x - length * angle.cos(), tip.y - length * angle.sin()),
        length,
    }
}

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system to parse color names from the config file.
/// Names follow the editor palette: black, white, red, orange, yellow, green,
/// blue, purple (case-insensitive).
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "black" => Some(BLACK),
        "white" => Some(WHITE),
        "red" => Some(RED),
        "orange" => Some(ORANGE),
        "yellow" => Some(YELLOW),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "purple" => Some(PURPLE),
        _ => None,
    }
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` into a color.
pub fn parse_hex_color(input: &str) -> Option<Color> {
    let hex = input.strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f64 / 255.0);
    match hex.len() {
        3 => {
            let mut parts = hex.chars().map(|c| {
                u8::from_str_radix(&c.to_string(), 16)
                    .ok()
                    .map(|v| (v * 17) as f64 / 255.0)
            });
            Some(Color::new(parts.next()??, parts.next()??, parts.next()??, 1.0))
        }
        6 => Some(Color::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            1.0,
        )),
        8 => Some(Color::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => None,
    }
}

// ============================================================================
// Paths
// ============================================================================

/// Expands a leading `~/` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
