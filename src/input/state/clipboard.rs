//! Paste and copy.
//!
//! The host owns the system clipboard; it hands raw image bytes or a
//! previously copied primitive to [`InputState::paste`].

use crate::document::Edit;
use crate::draw::{BLACK, DecodeError, ImagePayload, Primitive, PrimitiveId, PrimitiveKind, raster};
use crate::input::tool::Tool;
use crate::notification::Notice;
use crate::util::Rect;
use log::{info, warn};
use thiserror::Error;

use super::InputState;

/// Where pasted image layers land on a non-empty document.
pub const PASTE_ORIGIN: f64 = 20.0;

/// Offset applied to a pasted copy of a primitive.
pub const PASTE_OFFSET: f64 = 20.0;

/// Title given to a document whose background came from the clipboard.
pub const PASTED_TITLE: &str = "Pasted Image";

/// Clipboard data handed over by the host.
#[derive(Debug, Clone)]
pub enum ClipboardContent {
    /// Encoded raster (PNG, JPEG, ...)
    Image(Vec<u8>),
    /// Primitive from an earlier [`InputState::copy_selection`]
    Primitive(Primitive),
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard image could not be read: {0}")]
    Decode(#[from] DecodeError),

    #[error("clipboard is empty")]
    Empty,
}

impl InputState {
    /// Pastes clipboard content into the active document.
    ///
    /// Failures leave the document untouched and are also queued as a
    /// notice.
    pub fn paste(
        &mut self,
        content: ClipboardContent,
    ) -> Result<Option<PrimitiveId>, ClipboardError> {
        let result = match content {
            ClipboardContent::Image(bytes) => self.paste_image(bytes),
            ClipboardContent::Primitive(primitive) => Ok(Some(self.paste_primitive(primitive))),
        };
        if let Err(err) = &result {
            warn!("Paste failed: {}", err);
            self.notices.push(Notice::new("Paste failed", err.to_string()));
        }
        result
    }

    /// Pastes an encoded image.
    ///
    /// An empty document takes it as background, resizes to it and is
    /// retitled, and `None` is returned. Otherwise the image becomes a layer
    /// at its natural size, is committed and selected.
    pub fn paste_image(&mut self, bytes: Vec<u8>) -> Result<Option<PrimitiveId>, ClipboardError> {
        if bytes.is_empty() {
            return Err(ClipboardError::Empty);
        }
        // Full decode up front; an intact header can still hide corrupt data.
        let surface = raster::decode_raster(&bytes)?;
        let (width, height) = (surface.width().max(0) as u32, surface.height().max(0) as u32);
        let payload = ImagePayload::new(bytes);

        if matches!(self.state, super::DrawingState::TextEditing { .. }) {
            self.commit_text_edit();
        }
        self.abandon_gesture();
        self.image_cache.insert_decoded(&payload, surface);

        if self.document().is_empty() {
            let doc = self.document_mut();
            doc.set_background(payload, width, height);
            doc.set_title(PASTED_TITLE);
            info!("Pasted {}x{} image as background", width, height);
            self.selected = None;
            self.needs_redraw = true;
            return Ok(None);
        }

        let primitive = Primitive::new(
            PrimitiveKind::Image {
                bounds: Rect::new(PASTE_ORIGIN, PASTE_ORIGIN, width as f64, height as f64),
                payload,
            },
            BLACK,
            0.0,
        );
        let id = primitive.id;
        self.document_mut().apply_and_commit(Edit::Insert(primitive));
        info!("Pasted {}x{} image layer", width, height);
        self.set_tool(Tool::Select);
        self.select(Some(id));
        Ok(Some(id))
    }

    /// Inserts a copy of `primitive` with a fresh id, nudged down-right.
    pub fn paste_primitive(&mut self, primitive: Primitive) -> PrimitiveId {
        if matches!(self.state, super::DrawingState::TextEditing { .. }) {
            self.commit_text_edit();
        }
        self.abandon_gesture();

        let mut copy = primitive;
        copy.id = PrimitiveId::new();
        copy.translate(PASTE_OFFSET, PASTE_OFFSET);
        let id = copy.id;
        self.document_mut().apply_and_commit(Edit::Insert(copy));
        self.select(Some(id));
        id
    }

    /// The selected primitive, for the host to keep on its clipboard.
    pub fn copy_selection(&self) -> Option<Primitive> {
        self.selected().cloned()
    }
}
