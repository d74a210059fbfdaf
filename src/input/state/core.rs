//! Interaction state machine and editor session state.

use crate::config::{Action, Config, KeyBinding};
use crate::document::{Document, Edit, Workspace};
use crate::draw::{
    FontDescriptor, ImageCache, ImagePayload, Primitive, PrimitiveId, PrimitiveKind, ViewTransform,
};
use crate::hit_test::Handle;
use crate::input::{events::CursorHint, modifiers::Modifiers, settings::ToolSettings, tool::Tool};
use crate::notification::{Notice, NoticeQueue};
use crate::util::{Point, Rect};
use log::{debug, info, warn};
use std::collections::HashMap;

/// Multiplier applied per zoom step.
pub const ZOOM_STEP: f64 = 1.25;

/// What a `Drawing` gesture is building.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    /// Shape or stroke, drawn live exactly as it will be committed
    Shape(Primitive),
    /// Box that becomes a text editor on release
    TextBox(Rect),
    Crop(Rect),
    Eraser(Rect),
}

/// Current gesture.
///
/// At most one is active. Entering a state replaces whatever transient
/// element the previous one left behind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawingState {
    /// No gesture in progress
    #[default]
    Idle,
    /// Building a new primitive from a drag
    Drawing {
        /// Pointer-down position, the anchor for box tools
        start: Point,
        draft: Draft,
    },
    /// Moving the selected primitive
    DraggingSelection {
        id: PrimitiveId,
        /// Position at the previous move event
        last: Point,
    },
    /// Dragging a resize handle of the selected primitive
    ResizingElement {
        handle: Handle,
        start: Point,
        original: Primitive,
    },
    /// Dragging the rotation knob
    RotatingElement { original: Primitive },
    /// Dragging one of the canvas edge handles (screen coordinates)
    ResizingCanvas {
        handle: Handle,
        start_screen: Point,
        start_width: f64,
        start_height: f64,
        /// Origin shift already applied to the primitives
        shifted: Point,
    },
    /// Typing into a text box
    TextEditing {
        /// Text primitive being edited, if any. It stays in the list until
        /// the edit is committed.
        original: Option<Primitive>,
        bounds: Rect,
        buffer: String,
    },
}

/// Editor state for one window: open documents, tool, selection and gesture.
///
/// Hosts forward pointer and keyboard events in screen coordinates and call
/// [`InputState::render`] whenever `needs_redraw` is set.
pub struct InputState {
    /// Open documents
    pub workspace: Workspace,
    pub(super) tool: Tool,
    pub(super) settings: ToolSettings,
    /// Current modifier key state
    pub modifiers: Modifiers,
    /// Current gesture
    pub state: DrawingState,
    pub(super) selected: Option<PrimitiveId>,
    /// Label of the next stamp. Increments after every placement.
    pub stamp_counter: u32,
    pub(super) cursor: CursorHint,
    /// Whether the display needs to be redrawn
    pub needs_redraw: bool,
    /// Messages for the user
    pub notices: NoticeQueue,
    /// Font for text primitives and stamp labels
    pub font: FontDescriptor,
    /// Decoded background and image-layer bitmaps
    pub image_cache: ImageCache,
    pub(super) pixel_ratio: f64,
    action_map: HashMap<KeyBinding, Action>,
}

impl InputState {
    /// Creates an editor with one blank document.
    pub fn with_defaults(
        workspace: Workspace,
        settings: ToolSettings,
        font: FontDescriptor,
        action_map: HashMap<KeyBinding, Action>,
    ) -> Self {
        Self {
            workspace,
            tool: Tool::Select,
            settings,
            modifiers: Modifiers::new(),
            state: DrawingState::Idle,
            selected: None,
            stamp_counter: 1,
            cursor: CursorHint::Default,
            needs_redraw: true,
            notices: NoticeQueue::new(),
            font,
            image_cache: ImageCache::new(),
            pixel_ratio: 1.0,
            action_map,
        }
    }

    /// Creates an editor configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        let action_map = config.keybindings.build_action_map().unwrap_or_else(|err| {
            warn!("Invalid keybindings ({}), using defaults", err);
            crate::config::KeybindingsConfig::default()
                .build_action_map()
                .unwrap_or_default()
        });
        Self::with_defaults(
            Workspace::new(config.canvas.default_width, config.canvas.default_height),
            ToolSettings::from_config(&config.drawing),
            config.font(),
            action_map,
        )
    }

    pub fn document(&self) -> &Document {
        self.workspace.active()
    }

    pub fn document_mut(&mut self) -> &mut Document {
        self.workspace.active_mut()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switches tool. Clears the selection and ends any gesture; an open text
    /// edit is committed first.
    pub fn set_tool(&mut self, tool: Tool) {
        if matches!(self.state, DrawingState::TextEditing { .. }) {
            self.commit_text_edit();
        }
        self.abandon_gesture();
        self.selected = None;
        self.tool = tool;
        self.cursor = tool.cursor();
        self.needs_redraw = true;
        debug!("Tool switched to {}", tool.name());
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    pub fn selected_id(&self) -> Option<PrimitiveId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Primitive> {
        self.selected.and_then(|id| self.document().primitive(id))
    }

    /// Selects `id` (or nothing) and copies its color and stroke width into
    /// the tool settings.
    pub fn select(&mut self, id: Option<PrimitiveId>) {
        self.selected = id;
        if let Some(primitive) = id.and_then(|id| self.workspace.active().primitive(id)) {
            if !matches!(primitive.kind, PrimitiveKind::Image { .. }) {
                self.settings.color = primitive.color;
                self.settings.stroke_width = primitive.stroke_width;
            }
        }
        self.needs_redraw = true;
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.needs_redraw = true;
        }
    }

    /// Changes tool settings. With a selection, the selected primitive is
    /// restyled and committed if that changes it.
    pub fn update_settings(&mut self, update: impl FnOnce(&mut ToolSettings)) {
        update(&mut self.settings);
        self.needs_redraw = true;

        let Some(current) = self.selected().cloned() else {
            return;
        };
        let restyled = self.settings.restyle(&current);
        if self.document_mut().apply_and_commit(Edit::Update(restyled)) {
            debug!("Restyled selected {}", current.kind_name());
        }
    }

    pub fn set_color(&mut self, color: crate::draw::Color) {
        self.update_settings(|s| s.color = color);
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.update_settings(|s| s.stroke_width = width);
    }

    pub fn set_arrow_style(&mut self, style: crate::draw::ArrowStyle) {
        self.update_settings(|s| s.arrow_style = style);
    }

    pub fn set_stamp_style(&mut self, style: crate::draw::StampStyle) {
        self.update_settings(|s| s.stamp_style = style);
    }

    pub fn set_pixelate_style(&mut self, style: crate::draw::PixelateStyle) {
        self.update_settings(|s| s.pixelate_style = style);
    }

    pub fn set_highlighter_mode(&mut self, mode: crate::config::HighlighterMode) {
        self.settings.highlighter_mode = mode;
    }

    /// Device pixels per logical pixel on the host surface.
    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
        self.needs_redraw = true;
    }

    /// Transform of the active document's view.
    pub fn view_transform(&self) -> ViewTransform {
        ViewTransform::new(self.document().view_scale(), self.pixel_ratio)
    }

    /// Maps a screen-space pointer position into canvas coordinates.
    pub(super) fn to_canvas(&self, x: f64, y: f64) -> Point {
        self.view_transform().screen_to_canvas(x, y)
    }

    pub fn set_zoom(&mut self, scale: f64) {
        self.document_mut().set_view_scale(scale);
        self.needs_redraw = true;
    }

    pub fn zoom_in(&mut self) {
        let scale = self.document().view_scale() * ZOOM_STEP;
        self.set_zoom(scale);
    }

    pub fn zoom_out(&mut self) {
        let scale = self.document().view_scale() / ZOOM_STEP;
        self.set_zoom(scale);
    }

    /// Opens a blank document and switches to it.
    pub fn new_document(&mut self) -> usize {
        self.leave_document();
        let index = self.workspace.new_document();
        self.tool = Tool::Select;
        self.cursor = CursorHint::Default;
        index
    }

    pub fn activate_document(&mut self, index: usize) -> bool {
        if index == self.workspace.active_index() {
            return false;
        }
        self.leave_document();
        self.workspace.activate(index)
    }

    pub fn close_document(&mut self, index: usize) -> bool {
        if index == self.workspace.active_index() {
            self.leave_document();
        }
        let closed = self.workspace.close(index);
        if closed {
            self.prune_image_cache();
            self.needs_redraw = true;
        }
        closed
    }

    /// Swaps in a restored workspace. Backgrounds and image layers are queued
    /// for decoding.
    pub fn replace_workspace(&mut self, workspace: Workspace) {
        self.leave_document();
        self.workspace = workspace;
        let payloads = self.live_payloads();
        self.image_cache.retain(&payloads.iter().collect::<Vec<_>>());
        self.image_cache.preload(&payloads);
    }

    /// Every payload the open documents currently show.
    fn live_payloads(&self) -> Vec<ImagePayload> {
        self.workspace
            .documents()
            .iter()
            .flat_map(|doc| {
                doc.background().into_iter().chain(doc.primitives().iter().filter_map(
                    |p| match &p.kind {
                        PrimitiveKind::Image { payload, .. } => Some(payload),
                        _ => None,
                    },
                ))
            })
            .cloned()
            .collect()
    }

    /// Frees decoded bitmaps no open document references. Undone layers are
    /// decoded again if they come back.
    pub(super) fn prune_image_cache(&mut self) {
        let payloads = self.live_payloads();
        self.image_cache.retain(&payloads.iter().collect::<Vec<_>>());
    }

    /// Drops selection and any gesture before the active document changes.
    fn leave_document(&mut self) {
        self.abandon_gesture();
        self.selected = None;
        self.needs_redraw = true;
    }

    /// Ends the current gesture without committing it. Uncommitted edits
    /// made by drags are rolled back; text edits are discarded.
    pub(super) fn abandon_gesture(&mut self) {
        match std::mem::take(&mut self.state) {
            DrawingState::Idle => return,
            DrawingState::DraggingSelection { .. }
            | DrawingState::ResizingElement { .. }
            | DrawingState::RotatingElement { .. } => self.document_mut().revert_to_committed(),
            DrawingState::ResizingCanvas {
                start_width,
                start_height,
                shifted,
                ..
            } => {
                let doc = self.document_mut();
                doc.revert_to_committed();
                doc.resize_canvas(start_width.round() as u32, start_height.round() as u32);
                debug!("Canvas resize abandoned (shift {:?})", shifted);
            }
            DrawingState::Drawing { .. } | DrawingState::TextEditing { .. } => {}
        }
        self.needs_redraw = true;
    }

    /// Closes the text editor, writing its content back.
    ///
    /// An edited primitive is removed first; non-empty text is inserted again
    /// (same id and style when editing) and selected. Always commits.
    pub fn commit_text_edit(&mut self) {
        let DrawingState::TextEditing {
            original,
            bounds,
            buffer,
        } = std::mem::take(&mut self.state)
        else {
            return;
        };

        let settings = self.settings;
        let doc = self.workspace.active_mut();
        if let Some(original) = &original {
            doc.apply(Edit::Remove(original.id));
        }

        let mut inserted = None;
        if !buffer.trim().is_empty() {
            let kind = PrimitiveKind::Text {
                bounds,
                text: buffer,
            };
            let primitive = match original {
                Some(mut existing) => {
                    existing.kind = kind;
                    existing
                }
                None => Primitive::new(kind, settings.color, settings.stroke_width),
            };
            inserted = Some(primitive.id);
            doc.apply(Edit::Insert(primitive));
        }
        doc.commit();

        self.select(inserted);
        self.needs_redraw = true;
    }

    /// Closes the text editor without touching the document.
    pub fn cancel_text_edit(&mut self) {
        if matches!(self.state, DrawingState::TextEditing { .. }) {
            self.state = DrawingState::Idle;
            self.needs_redraw = true;
        }
    }

    /// Places a stamp labelled with the counter, commits and selects it.
    pub(super) fn place_stamp(&mut self, center: Point) {
        let primitive = Primitive::new(
            PrimitiveKind::Stamp {
                center,
                label: self.stamp_counter.to_string(),
                style: self.settings.stamp_style,
            },
            self.settings.color,
            self.settings.stroke_width,
        );
        let id = primitive.id;
        self.document_mut().apply_and_commit(Edit::Insert(primitive));
        self.stamp_counter = self.stamp_counter.saturating_add(1);
        self.select(Some(id));
    }

    pub(super) fn find_action(&self, key_str: &str) -> Option<Action> {
        self.action_map
            .iter()
            .find(|(binding, _)| {
                binding.matches(
                    key_str,
                    self.modifiers.ctrl,
                    self.modifiers.shift,
                    self.modifiers.alt,
                )
            })
            .map(|(_, action)| *action)
    }

    /// Takes all queued user notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Finishes queued image decodes; requests a redraw if any completed.
    pub fn process_pending_decodes(&mut self) -> usize {
        let done = self.image_cache.process_pending();
        if done > 0 {
            info!("Decoded {} image(s)", done);
            self.needs_redraw = true;
        }
        done
    }
}
