use crate::config::HighlighterMode;
use crate::document::{Edit, MIN_CANVAS_SIZE, MIN_CROP_SIZE};
use crate::draw::{Primitive, PrimitiveKind};
use crate::hit_test::{Handle, hit_test, primitive_contains, resize_handle_at};
use crate::input::{
    events::{CursorHint, MouseButton},
    tool::Tool,
};
use crate::util::{Point, Rect, rotate_point};
use log::debug;
use std::f64::consts::FRAC_PI_2;

use super::core::Draft;
use super::{DrawingState, InputState};

/// Shapes, lines and highlighter boxes narrower than this are dropped as
/// accidental clicks.
pub const MIN_SHAPE_SIZE: f64 = 5.0;

/// Text boxes must be at least this big in both dimensions.
pub const MIN_TEXT_BOX_SIZE: f64 = 10.0;

/// Region effects and eraser boxes below this are no-ops.
const MIN_REGION_SIZE: f64 = 1.0;

impl InputState {
    /// Processes a pointer button press at screen position `(x, y)`.
    ///
    /// Resolution order for the primary button:
    /// 1. An open text editor is committed and the click ends there
    /// 2. A handle of the selected (unlocked) primitive starts a resize or rotation
    /// 3. With the select tool, or Ctrl held, the topmost primitive under the
    ///    pointer is selected and, if unlocked, dragged
    /// 4. Otherwise the selection is cleared and the tool starts drawing
    ///
    /// The secondary button abandons the current gesture.
    pub fn on_pointer_down(&mut self, button: MouseButton, x: f64, y: f64) {
        match button {
            MouseButton::Left => {}
            MouseButton::Right => {
                if matches!(self.state, DrawingState::TextEditing { .. }) {
                    self.cancel_text_edit();
                } else {
                    self.abandon_gesture();
                }
                return;
            }
            MouseButton::Middle => return,
        }

        if matches!(self.state, DrawingState::TextEditing { .. }) {
            self.commit_text_edit();
            return;
        }
        self.abandon_gesture();

        let point = self.to_canvas(x, y);

        if let Some(selected) = self.selected().cloned() {
            if let Some(handle) = resize_handle_at(point, &selected) {
                debug!("Grabbed {:?} handle of {}", handle, selected.kind_name());
                self.state = match handle {
                    Handle::Rotate => DrawingState::RotatingElement { original: selected },
                    _ => DrawingState::ResizingElement {
                        handle,
                        start: point,
                        original: selected,
                    },
                };
                return;
            }
        }

        if self.tool == Tool::Select || self.modifiers.forces_selection() {
            let hit = hit_test(point, self.document().primitives());
            self.select(hit);
            if let Some(primitive) = self.selected() {
                if !primitive.locked {
                    self.state = DrawingState::DraggingSelection {
                        id: primitive.id,
                        last: point,
                    };
                }
            }
            return;
        }

        self.clear_selection();

        if self.tool == Tool::Stamp {
            self.place_stamp(point);
            return;
        }

        if let Some(draft) = self.start_draft(point) {
            self.state = DrawingState::Drawing {
                start: point,
                draft,
            };
            self.needs_redraw = true;
        }
    }

    /// Processes pointer motion at screen position `(x, y)`.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        let point = self.to_canvas(x, y);
        let mut state = std::mem::take(&mut self.state);

        match &mut state {
            DrawingState::Idle => {
                self.cursor = self.hover_cursor(point);
            }
            DrawingState::Drawing { start, draft } => {
                let lock_axis = self.modifiers.locks_axis();
                update_draft(draft, *start, point, lock_axis);
                self.needs_redraw = true;
            }
            DrawingState::DraggingSelection { id, last } => {
                let dx = point.x - last.x;
                let dy = point.y - last.y;
                if self
                    .document_mut()
                    .apply(Edit::Translate { id: *id, dx, dy })
                {
                    self.needs_redraw = true;
                }
                *last = point;
            }
            DrawingState::ResizingElement {
                handle,
                start,
                original,
            } => {
                let updated = resize_primitive(original, *handle, point.x - start.x, point.y - start.y);
                self.document_mut().apply(Edit::Update(updated));
                self.needs_redraw = true;
            }
            DrawingState::RotatingElement { original } => {
                let mut updated = original.clone();
                updated.rotation = rotation_towards(original, point);
                self.document_mut().apply(Edit::Update(updated));
                self.needs_redraw = true;
            }
            DrawingState::ResizingCanvas {
                handle,
                start_screen,
                start_width,
                start_height,
                shifted,
            } => {
                let view = self.view_transform();
                let dx = view.screen_delta_to_canvas(x - start_screen.x);
                let dy = view.screen_delta_to_canvas(y - start_screen.y);
                let (width, height) =
                    resized_canvas(*handle, *start_width, *start_height, dx, dy);

                let shift = Point::new(
                    if handle.moves_west() { width - *start_width } else { 0.0 },
                    if handle.moves_north() { height - *start_height } else { 0.0 },
                );
                let doc = self.document_mut();
                doc.apply(Edit::ShiftAll {
                    dx: shift.x - shifted.x,
                    dy: shift.y - shifted.y,
                });
                doc.resize_canvas(width as u32, height as u32);
                *shifted = shift;
                self.needs_redraw = true;
            }
            DrawingState::TextEditing { .. } => {}
        }

        self.state = state;
    }

    /// Processes a pointer button release at screen position `(x, y)`.
    pub fn on_pointer_up(&mut self, button: MouseButton, x: f64, y: f64) {
        if button != MouseButton::Left {
            return;
        }
        if !matches!(self.state, DrawingState::Idle | DrawingState::TextEditing { .. }) {
            self.on_pointer_move(x, y);
        }
        self.finish_gesture();
    }

    /// Pointer left the canvas: finishes the gesture like a release.
    pub fn on_pointer_leave(&mut self) {
        self.finish_gesture();
    }

    /// Opens the text editor on the topmost text primitive under the pointer.
    pub fn on_double_click(&mut self, x: f64, y: f64) {
        let point = self.to_canvas(x, y);
        let hit = self
            .document()
            .primitives()
            .iter()
            .rev()
            .find(|p| matches!(p.kind, PrimitiveKind::Text { .. }) && primitive_contains(p, point))
            .cloned();

        let Some(primitive) = hit else {
            return;
        };
        let PrimitiveKind::Text { bounds, text } = &primitive.kind else {
            return;
        };

        if matches!(self.state, DrawingState::TextEditing { .. }) {
            self.commit_text_edit();
        }
        self.abandon_gesture();
        self.selected = None;
        self.state = DrawingState::TextEditing {
            bounds: *bounds,
            buffer: text.clone(),
            original: Some(primitive.clone()),
        };
        self.needs_redraw = true;
    }

    /// Starts dragging a canvas edge handle at screen position `(x, y)`.
    ///
    /// Canvas handles live outside the canvas, so the host reports them
    /// directly. North and west edges move the origin and shift every
    /// primitive with it.
    pub fn begin_canvas_resize(&mut self, handle: Handle, x: f64, y: f64) {
        if handle == Handle::Rotate {
            return;
        }
        if matches!(self.state, DrawingState::TextEditing { .. }) {
            self.commit_text_edit();
        }
        self.abandon_gesture();
        let (width, height) = self.document().canvas_size();
        self.state = DrawingState::ResizingCanvas {
            handle,
            start_screen: Point::new(x, y),
            start_width: width as f64,
            start_height: height as f64,
            shifted: Point::default(),
        };
    }

    /// Ends the current pointer gesture, committing its result.
    fn finish_gesture(&mut self) {
        match std::mem::take(&mut self.state) {
            DrawingState::Idle => {}
            state @ DrawingState::TextEditing { .. } => self.state = state,
            DrawingState::DraggingSelection { .. }
            | DrawingState::ResizingElement { .. }
            | DrawingState::RotatingElement { .. }
            | DrawingState::ResizingCanvas { .. } => {
                self.document_mut().commit();
                self.needs_redraw = true;
            }
            DrawingState::Drawing { draft, .. } => self.finish_draft(draft),
        }
    }

    fn finish_draft(&mut self, draft: Draft) {
        self.needs_redraw = true;
        match draft {
            Draft::Crop(area) => {
                let area = area.normalized();
                if area.width > MIN_CROP_SIZE
                    && area.height > MIN_CROP_SIZE
                    && self.document_mut().crop(area)
                {
                    self.prune_image_cache();
                }
                self.set_tool(Tool::Select);
            }
            Draft::Eraser(area) => {
                let area = area.normalized();
                if area.is_smaller_than(MIN_REGION_SIZE) {
                    return;
                }
                self.document_mut().apply_and_commit(Edit::Erase(area));
            }
            Draft::TextBox(area) => {
                let area = area.normalized();
                if area.is_smaller_than(MIN_TEXT_BOX_SIZE) {
                    return;
                }
                self.state = DrawingState::TextEditing {
                    original: None,
                    bounds: area,
                    buffer: String::new(),
                };
            }
            Draft::Shape(mut primitive) => {
                if is_accidental(&primitive) {
                    debug!("Discarding tiny {}", primitive.kind_name());
                    return;
                }
                primitive.normalize();
                let id = primitive.id;
                self.document_mut().apply_and_commit(Edit::Insert(primitive));
                self.select(Some(id));
            }
        }
    }

    /// Seed of a new draft for the active tool at `point`.
    fn start_draft(&self, point: Point) -> Option<Draft> {
        let zero = Rect::new(point.x, point.y, 0.0, 0.0);
        let settings = &self.settings;
        let kind = match self.tool {
            Tool::Select | Tool::Stamp => return None,
            Tool::Text => return Some(Draft::TextBox(zero)),
            Tool::Crop => return Some(Draft::Crop(zero)),
            Tool::Eraser => return Some(Draft::Eraser(zero)),
            Tool::Pen => PrimitiveKind::Pen {
                points: vec![point],
            },
            Tool::Highlighter => match settings.highlighter_mode {
                HighlighterMode::Brush => PrimitiveKind::Highlight {
                    points: vec![point],
                },
                HighlighterMode::Rect => PrimitiveKind::HighlightRect { bounds: zero },
            },
            Tool::Rect => PrimitiveKind::Rect { bounds: zero },
            Tool::Circle => PrimitiveKind::Ellipse { bounds: zero },
            Tool::Triangle => PrimitiveKind::Triangle { bounds: zero },
            Tool::Diamond => PrimitiveKind::Diamond { bounds: zero },
            Tool::Line => PrimitiveKind::Line { bounds: zero },
            Tool::Arrow => PrimitiveKind::Arrow {
                bounds: zero,
                style: settings.arrow_style,
            },
            Tool::Pixelate => PrimitiveKind::Pixelate {
                bounds: zero,
                style: settings.pixelate_style,
            },
        };
        Some(Draft::Shape(Primitive::new(
            kind,
            settings.color,
            settings.stroke_width,
        )))
    }

    /// Cursor for an idle pointer at `point`.
    fn hover_cursor(&self, point: Point) -> CursorHint {
        self.selected()
            .and_then(|selected| resize_handle_at(point, selected))
            .map(handle_cursor)
            .unwrap_or_else(|| self.tool.cursor())
    }
}

/// Grows the draft towards `point`.
///
/// Boxes stay anchored at `start` and may have negative width/height.
fn update_draft(draft: &mut Draft, start: Point, point: Point, lock_axis: bool) {
    let bounds = Rect::new(start.x, start.y, point.x - start.x, point.y - start.y);
    match draft {
        Draft::TextBox(area) | Draft::Crop(area) | Draft::Eraser(area) => *area = bounds,
        Draft::Shape(primitive) => match &mut primitive.kind {
            PrimitiveKind::Pen { points } => points.push(point),
            PrimitiveKind::Highlight { points } => {
                let next = if lock_axis {
                    Point::new(point.x, start.y)
                } else {
                    point
                };
                points.push(next);
            }
            _ => {
                if let Some(b) = primitive.bounds_mut() {
                    *b = bounds;
                }
            }
        },
    }
}

/// Whether a finished draft is too small to keep.
fn is_accidental(primitive: &Primitive) -> bool {
    match &primitive.kind {
        PrimitiveKind::Pen { .. } | PrimitiveKind::Highlight { .. } => false,
        PrimitiveKind::Pixelate { bounds, .. } => bounds.normalized().is_smaller_than(MIN_REGION_SIZE),
        _ => primitive
            .bounds()
            .is_some_and(|b| b.normalized().is_smaller_than(MIN_SHAPE_SIZE)),
    }
}

/// `original` with its box dragged by `(dx, dy)` through `handle`.
///
/// The delta is taken into the primitive's unrotated frame. Image corners
/// keep the aspect ratio.
pub(crate) fn resize_primitive(original: &Primitive, handle: Handle, dx: f64, dy: f64) -> Primitive {
    let mut updated = original.clone();
    let keep_aspect = matches!(original.kind, PrimitiveKind::Image { .. }) && handle.is_corner();
    let local = rotate_point(Point::new(dx, dy), Point::default(), -original.effective_rotation());
    if let Some(bounds) = updated.bounds_mut() {
        *bounds = resize_bounds(*bounds, handle, local.x, local.y, keep_aspect);
    }
    updated
}

/// Applies a handle drag to a box.
///
/// Works on the normalized box, then restores the sign of width/height so
/// lines and arrows keep pointing the same way.
pub(crate) fn resize_bounds(raw: Rect, handle: Handle, dx: f64, dy: f64, keep_aspect: bool) -> Rect {
    let n = raw.normalized();
    let mut r = n;

    if keep_aspect && handle.is_corner() {
        let ratio = if n.width != 0.0 && n.height != 0.0 {
            (n.width / n.height).abs()
        } else {
            1.0
        };
        r.width = if handle.moves_east() {
            n.width + dx
        } else {
            n.width - dx
        };
        r.height = r.width / ratio;
        if handle.moves_west() {
            r.x = n.x + dx;
        }
        if handle.moves_north() {
            r.y = n.y + (n.height - r.height);
        }
    } else {
        if handle.moves_east() {
            r.width += dx;
        }
        if handle.moves_south() {
            r.height += dy;
        }
        if handle.moves_west() {
            r.x += dx;
            r.width -= dx;
        }
        if handle.moves_north() {
            r.y += dy;
            r.height -= dy;
        }
    }

    if raw.width < 0.0 {
        r = Rect::new(r.right(), r.y, -r.width, r.height);
    }
    if raw.height < 0.0 {
        r = Rect::new(r.x, r.bottom(), r.width, -r.height);
    }
    r
}

/// Rotation that points the knob of `original` at `point`.
///
/// Absolute, not incremental: the knob sits straight above the center at
/// rotation zero.
fn rotation_towards(original: &Primitive, point: Point) -> f64 {
    let c = original.rotation_center();
    (point.y - c.y).atan2(point.x - c.x) + FRAC_PI_2
}

/// New canvas size for a cumulative edge drag, rounded and clamped.
fn resized_canvas(handle: Handle, start_width: f64, start_height: f64, dx: f64, dy: f64) -> (f64, f64) {
    let mut width = start_width;
    let mut height = start_height;
    if handle.moves_east() {
        width = start_width + dx;
    }
    if handle.moves_west() {
        width = start_width - dx;
    }
    if handle.moves_south() {
        height = start_height + dy;
    }
    if handle.moves_north() {
        height = start_height - dy;
    }
    let min = MIN_CANVAS_SIZE as f64;
    (width.round().max(min), height.round().max(min))
}

fn handle_cursor(handle: Handle) -> CursorHint {
    match handle {
        Handle::Nw | Handle::Se => CursorHint::ResizeNwse,
        Handle::Ne | Handle::Sw => CursorHint::ResizeNesw,
        Handle::N | Handle::S => CursorHint::ResizeNs,
        Handle::E | Handle::W => CursorHint::ResizeEw,
        Handle::Rotate => CursorHint::Rotate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_handles_move_one_side() {
        let r = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert_eq!(
            resize_bounds(r, Handle::E, 20.0, 99.0, false),
            Rect::new(10.0, 10.0, 120.0, 50.0)
        );
        assert_eq!(
            resize_bounds(r, Handle::Nw, 5.0, 5.0, false),
            Rect::new(15.0, 15.0, 95.0, 45.0)
        );
    }

    #[test]
    fn aspect_lock_anchors_opposite_corner() {
        let r = Rect::new(0.0, 0.0, 200.0, 100.0);
        let out = resize_bounds(r, Handle::Nw, 50.0, 0.0, true);
        assert_eq!(out, Rect::new(50.0, 25.0, 150.0, 75.0));
        assert_eq!(out.right(), 200.0);
        assert_eq!(out.bottom(), 100.0);

        // Edge handles are free even with the lock.
        let out = resize_bounds(r, Handle::S, 0.0, 30.0, true);
        assert_eq!(out, Rect::new(0.0, 0.0, 200.0, 130.0));
    }

    #[test]
    fn direction_survives_resize() {
        // Arrow pointing from (100, 100) up-left to (0, 0).
        let raw = Rect::new(100.0, 100.0, -100.0, -100.0);
        let out = resize_bounds(raw, Handle::Se, 10.0, 10.0, false);
        assert_eq!(out, Rect::new(110.0, 110.0, -110.0, -110.0));
    }

    #[test]
    fn canvas_resize_clamps_to_minimum() {
        assert_eq!(resized_canvas(Handle::W, 100.0, 80.0, 500.0, 0.0), (10.0, 80.0));
        assert_eq!(resized_canvas(Handle::Se, 100.0, 80.0, 20.4, 9.6), (120.0, 90.0));
    }
}
