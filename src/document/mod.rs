//! Editable documents and their undo history.
//!
//! A [`Document`] owns the primitive list, its [`History`], the optional
//! background raster and the canvas size. All mutations of the primitive list
//! go through [`Document::apply`] with an [`Edit`] intent; gestures apply
//! edits live while the pointer moves and call [`Document::commit`] once they
//! finish, which records the resulting list as a new snapshot.

mod history;
mod workspace;

pub use history::History;
pub use workspace::Workspace;

use crate::draw::raster::ImagePayload;
use crate::draw::transform::clamp_view_scale;
use crate::draw::{Primitive, PrimitiveId};
use crate::util::Rect;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Smallest canvas edge, in canvas pixels.
pub const MIN_CANVAS_SIZE: u32 = 10;

pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// A crop box must exceed this in both dimensions.
pub const MIN_CROP_SIZE: f64 = 10.0;

/// Mutation intent consumed by [`Document::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Append on top of the stack
    Insert(Primitive),
    /// Replace the primitive carrying the same id
    Update(Primitive),
    /// Move one primitive
    Translate { id: PrimitiveId, dx: f64, dy: f64 },
    Remove(PrimitiveId),
    /// Remove every unlocked primitive whose bounding box overlaps the area
    Erase(Rect),
    /// Move every primitive (canvas origin shifts)
    ShiftAll { dx: f64, dy: f64 },
    Clear,
}

/// Persistable state of a document, without history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub primitives: Vec<Primitive>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    #[serde(default)]
    pub background: Option<ImagePayload>,
}

/// One editable canvas.
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    primitives: Vec<Primitive>,
    history: History,
    background: Option<ImagePayload>,
    canvas_width: u32,
    canvas_height: u32,
    view_scale: f64,
}

impl Document {
    /// Blank document: no background, empty history baseline, 100% zoom.
    pub fn new(title: impl Into<String>, canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            title: title.into(),
            primitives: Vec::new(),
            history: History::new(),
            background: None,
            canvas_width: canvas_width.max(MIN_CANVAS_SIZE),
            canvas_height: canvas_height.max(MIN_CANVAS_SIZE),
            view_scale: 1.0,
        }
    }

    /// Rebuilds a document from a snapshot with a single-entry history.
    pub fn from_snapshot(title: impl Into<String>, snapshot: DocumentSnapshot) -> Self {
        Self {
            title: title.into(),
            history: History::starting_at(snapshot.primitives.clone()),
            primitives: snapshot.primitives,
            background: snapshot.background,
            canvas_width: snapshot.canvas_width.max(MIN_CANVAS_SIZE),
            canvas_height: snapshot.canvas_height.max(MIN_CANVAS_SIZE),
            view_scale: 1.0,
        }
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            primitives: self.primitives.clone(),
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            background: self.background.clone(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.id == id)
    }

    fn index_of(&self, id: PrimitiveId) -> Option<usize> {
        self.primitives.iter().position(|p| p.id == id)
    }

    /// No background and no primitives.
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.primitives.is_empty()
    }

    /// Applies an edit to the working list without recording history.
    ///
    /// Returns whether anything changed.
    pub fn apply(&mut self, edit: Edit) -> bool {
        match edit {
            Edit::Insert(primitive) => {
                self.primitives.push(primitive);
                true
            }
            Edit::Update(primitive) => match self.index_of(primitive.id) {
                Some(i) if self.primitives[i] != primitive => {
                    self.primitives[i] = primitive;
                    true
                }
                _ => false,
            },
            Edit::Translate { id, dx, dy } => match self.index_of(id) {
                Some(i) if dx != 0.0 || dy != 0.0 => {
                    self.primitives[i].translate(dx, dy);
                    true
                }
                _ => false,
            },
            Edit::Remove(id) => match self.index_of(id) {
                Some(i) => {
                    self.primitives.remove(i);
                    true
                }
                None => false,
            },
            Edit::Erase(area) => {
                let before = self.primitives.len();
                self.primitives
                    .retain(|p| p.locked || !p.bounding_box().intersects(&area));
                let removed = before - self.primitives.len();
                if removed > 0 {
                    debug!("Eraser removed {} primitive(s)", removed);
                }
                removed > 0
            }
            Edit::ShiftAll { dx, dy } => {
                if dx == 0.0 && dy == 0.0 {
                    return false;
                }
                for p in &mut self.primitives {
                    p.translate(dx, dy);
                }
                !self.primitives.is_empty()
            }
            Edit::Clear => {
                let changed = !self.primitives.is_empty();
                self.primitives.clear();
                changed
            }
        }
    }

    /// Records the working list as a new history snapshot.
    pub fn commit(&mut self) {
        self.history.commit(self.primitives.clone());
    }

    /// Applies an edit and commits it if it changed anything.
    pub fn apply_and_commit(&mut self, edit: Edit) -> bool {
        let changed = self.apply(edit);
        if changed {
            self.commit();
        }
        changed
    }

    /// Restores the previous snapshot. No-op at the oldest one.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.primitives = snapshot.to_vec();
                true
            }
            None => false,
        }
    }

    /// Restores the next snapshot. No-op at the newest one.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.primitives = snapshot.to_vec();
                true
            }
            None => false,
        }
    }

    /// Drops uncommitted working changes.
    pub fn revert_to_committed(&mut self) {
        self.primitives = self.history.current().to_vec();
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn background(&self) -> Option<&ImagePayload> {
        self.background.as_ref()
    }

    /// Replaces the background and sizes the canvas to it.
    pub fn set_background(&mut self, payload: ImagePayload, width: u32, height: u32) {
        self.background = Some(payload);
        self.canvas_width = width.max(MIN_CANVAS_SIZE);
        self.canvas_height = height.max(MIN_CANVAS_SIZE);
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    /// Sets the canvas size, clamped to [`MIN_CANVAS_SIZE`]. Not versioned.
    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        self.canvas_width = width.max(MIN_CANVAS_SIZE);
        self.canvas_height = height.max(MIN_CANVAS_SIZE);
    }

    pub fn view_scale(&self) -> f64 {
        self.view_scale
    }

    pub fn set_view_scale(&mut self, scale: f64) {
        self.view_scale = clamp_view_scale(scale);
    }

    /// Crops the document to `area`.
    ///
    /// Every primitive moves by `(-x, -y)` and the shifted list is committed;
    /// the canvas takes the area's size and the background is cut to it.
    /// Canvas size and background are not part of the history, so undo after
    /// a crop restores positions only. Boxes not larger than
    /// [`MIN_CROP_SIZE`] in both dimensions are ignored.
    pub fn crop(&mut self, area: Rect) -> bool {
        let area = area.normalized();
        if area.width <= MIN_CROP_SIZE || area.height <= MIN_CROP_SIZE {
            debug!("Ignoring crop of {:?}: too small", area);
            return false;
        }

        let x = area.x.round();
        let y = area.y.round();
        let width = area.width.round() as u32;
        let height = area.height.round() as u32;

        if let Some(background) = &self.background {
            match crop_raster(background.bytes(), x, y, width, height) {
                Ok(cropped) => self.background = Some(cropped),
                Err(err) => warn!("Failed to crop background, keeping it unchanged: {}", err),
            }
        }

        for p in &mut self.primitives {
            p.translate(-x, -y);
        }
        self.resize_canvas(width, height);
        self.commit();
        info!(
            "Cropped '{}' to {}x{} at ({}, {})",
            self.title, width, height, x, y
        );
        true
    }
}

/// Cuts a region out of encoded image bytes and re-encodes it as PNG.
///
/// The region is clamped to the image; parts outside it are dropped.
fn crop_raster(
    bytes: &[u8],
    x: f64,
    y: f64,
    width: u32,
    height: u32,
) -> Result<ImagePayload, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let x = x.max(0.0) as u32;
    let y = y.max(0.0) as u32;
    let cropped = img.crop_imm(x, y, width, height);
    let mut out = Vec::new();
    cropped.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)?;
    Ok(ImagePayload::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::raster::tests::solid_png;
    use crate::draw::raster::decode_raster;
    use crate::draw::{PrimitiveKind, RED};
    use crate::util::Point;

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
    fn new_document_has_empty_baseline() {
        let doc = Document::new("Image_001", 800, 600);
        assert_eq!(doc.history().len(), 1);
        assert_eq!(doc.history().index(), 0);
        assert!(doc.is_empty());
        assert_eq!(doc.canvas_size(), (800, 600));
    }

    #[test]
    fn commit_then_undo_restores_previous_list() {
        let mut doc = Document::new("doc", 800, 600);
        doc.apply_and_commit(Edit::Insert(rect(10.0, 10.0, 100.0, 50.0)));
        assert_eq!(doc.history().len(), 2);
        assert_eq!(doc.history().index(), 1);

        assert!(doc.undo());
        assert!(doc.primitives().is_empty());
        assert_eq!(doc.history().index(), 0);
        assert!(!doc.undo());

        assert!(doc.redo());
        assert_eq!(doc.primitives().len(), 1);
    }

    #[test]
    fn update_is_noop_when_identical() {
        let mut doc = Document::new("doc", 800, 600);
        let r = rect(0.0, 0.0, 20.0, 20.0);
        doc.apply_and_commit(Edit::Insert(r.clone()));
        assert!(!doc.apply_and_commit(Edit::Update(r.clone())));
        assert_eq!(doc.history().len(), 2);

        let mut moved = r;
        moved.color = crate::draw::BLUE;
        assert!(doc.apply_and_commit(Edit::Update(moved)));
        assert_eq!(doc.history().len(), 3);
    }

    #[test]
    fn erase_skips_locked_primitives() {
        let mut doc = Document::new("doc", 800, 600);
        let mut locked = rect(0.0, 0.0, 20.0, 20.0);
        locked.locked = true;
        doc.apply(Edit::Insert(locked));
        doc.apply(Edit::Insert(rect(10.0, 10.0, 20.0, 20.0)));
        doc.apply(Edit::Insert(rect(200.0, 200.0, 20.0, 20.0)));

        assert!(doc.apply(Edit::Erase(Rect::new(15.0, 15.0, -10.0, -10.0))));
        assert_eq!(doc.primitives().len(), 2);
        assert!(doc.primitives()[0].locked);
        assert!(!doc.apply(Edit::Erase(Rect::new(500.0, 500.0, 5.0, 5.0))));
    }

    #[test]
    fn crop_shifts_paths_and_resizes_canvas() {
        let mut doc = Document::new("doc", 800, 600);
        doc.apply_and_commit(Edit::Insert(Primitive::new(
            PrimitiveKind::Pen {
                points: vec![Point::new(30.0, 30.0), Point::new(50.0, 50.0)],
            },
            RED,
            4.0,
        )));

        assert!(doc.crop(Rect::new(20.0, 20.0, 100.0, 100.0)));
        let PrimitiveKind::Pen { points } = &doc.primitives()[0].kind else {
            panic!("expected pen");
        };
        assert_eq!(points, &vec![Point::new(10.0, 10.0), Point::new(30.0, 30.0)]);
        assert_eq!(doc.canvas_size(), (100, 100));

        // Undo restores positions but not the canvas size.
        assert!(doc.undo());
        let PrimitiveKind::Pen { points } = &doc.primitives()[0].kind else {
            panic!("expected pen");
        };
        assert_eq!(points[0], Point::new(30.0, 30.0));
        assert_eq!(doc.canvas_size(), (100, 100));
    }

    #[test]
    fn crop_cuts_background() {
        let mut doc = Document::new("doc", 10, 10);
        doc.set_background(ImagePayload::new(solid_png(200, 150, [1, 2, 3, 255])), 200, 150);
        assert!(doc.crop(Rect::new(50.0, 50.0, 60.0, 40.0)));
        let bg = doc.background().unwrap();
        let surface = decode_raster(bg.bytes()).unwrap();
        assert_eq!((surface.width(), surface.height()), (60, 40));
    }

    #[test]
    fn tiny_crop_is_ignored() {
        let mut doc = Document::new("doc", 800, 600);
        assert!(!doc.crop(Rect::new(0.0, 0.0, 10.0, 300.0)));
        assert_eq!(doc.canvas_size(), (800, 600));
        assert_eq!(doc.history().len(), 1);
    }

    #[test]
    fn snapshot_rebuilds_with_fresh_history() {
        let mut doc = Document::new("doc", 300, 200);
        doc.apply_and_commit(Edit::Insert(rect(0.0, 0.0, 20.0, 20.0)));
        doc.apply_and_commit(Edit::Insert(rect(5.0, 5.0, 20.0, 20.0)));

        let restored = Document::from_snapshot("copy", doc.snapshot());
        assert_eq!(restored.primitives(), doc.primitives());
        assert_eq!(restored.history().len(), 1);
        assert_eq!(restored.canvas_size(), (300, 200));
    }

    #[test]
    fn canvas_and_zoom_are_clamped() {
        let mut doc = Document::new("doc", 800, 600);
        doc.resize_canvas(3, 0);
        assert_eq!(doc.canvas_size(), (MIN_CANVAS_SIZE, MIN_CANVAS_SIZE));
        doc.set_view_scale(12.0);
        assert_eq!(doc.view_scale(), 5.0);
    }
}
