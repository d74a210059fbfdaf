use crate::draw::{ActiveItem, Primitive, Scene, render_scene};
use crate::input::settings::ToolSettings;
use std::borrow::Cow;

use super::core::Draft;
use super::{DrawingState, InputState};

impl InputState {
    /// Renders the active document, the current gesture and the selection.
    ///
    /// A text primitive open in the editor is hidden; the editor draws its
    /// live buffer instead. Clears `needs_redraw`.
    pub fn render(&mut self, ctx: &cairo::Context) {
        let view = self.view_transform();
        let doc = self.workspace.active();

        let primitives: Cow<'_, [Primitive]> = match &self.state {
            DrawingState::TextEditing {
                original: Some(editing),
                ..
            } => Cow::Owned(
                doc.primitives()
                    .iter()
                    .filter(|p| p.id != editing.id)
                    .cloned()
                    .collect(),
            ),
            _ => Cow::Borrowed(doc.primitives()),
        };

        let draft = match &self.state {
            DrawingState::Drawing {
                draft: Draft::Shape(primitive),
                ..
            } => Some(display_draft(primitive)),
            _ => None,
        };

        let (width, height) = doc.canvas_size();
        let scene = Scene {
            background: doc.background(),
            canvas_width: width,
            canvas_height: height,
            primitives: &primitives,
            active: active_item(&self.state, draft.as_deref(), &self.settings),
            selected: self.selected.and_then(|id| doc.primitive(id)),
            font: &self.font,
        };
        render_scene(ctx, &scene, &view, &mut self.image_cache);
        self.needs_redraw = false;
    }

    /// Backing-surface size for the active document at the current zoom.
    pub fn device_size(&self) -> (i32, i32) {
        let (width, height) = self.document().canvas_size();
        self.view_transform().device_size(width, height)
    }
}

/// Boxes are shown normalized while dragged; lines and paths as they are.
fn display_draft(primitive: &Primitive) -> Cow<'_, Primitive> {
    if primitive.is_box() && !primitive.is_direction_sensitive() {
        let mut normalized = primitive.clone();
        normalized.normalize();
        Cow::Owned(normalized)
    } else {
        Cow::Borrowed(primitive)
    }
}

fn active_item<'a>(
    state: &'a DrawingState,
    draft: Option<&'a Primitive>,
    settings: &ToolSettings,
) -> Option<ActiveItem<'a>> {
    match state {
        DrawingState::Drawing { draft: kind, .. } => match kind {
            Draft::Shape(_) => draft.map(ActiveItem::Primitive),
            Draft::TextBox(area) => Some(ActiveItem::TextBox {
                bounds: area.normalized(),
                text: "",
                color: settings.color,
                stroke_width: settings.stroke_width,
            }),
            Draft::Crop(area) => Some(ActiveItem::Crop(area.normalized())),
            Draft::Eraser(area) => Some(ActiveItem::Eraser(area.normalized())),
        },
        DrawingState::TextEditing {
            original,
            bounds,
            buffer,
        } => {
            let (color, stroke_width) = original
                .as_ref()
                .map(|p| (p.color, p.stroke_width))
                .unwrap_or((settings.color, settings.stroke_width));
            Some(ActiveItem::TextBox {
                bounds: *bounds,
                text: buffer,
                color,
                stroke_width,
            })
        }
        _ => None,
    }
}
