//! Ordered set of open documents (tabs) with one active.

use super::Document;
use log::debug;

/// Manages the open documents.
///
/// There is always at least one document. New documents are titled
/// `Image_001`, `Image_002`, ... from a counter that never goes backwards,
/// so titles are not reused after a tab is closed.
#[derive(Debug, Clone)]
pub struct Workspace {
    documents: Vec<Document>,
    active: usize,
    next_number: u32,
    canvas_width: u32,
    canvas_height: u32,
}

impl Workspace {
    /// Creates a workspace holding one blank document of the given size.
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        let mut workspace = Self {
            documents: Vec::new(),
            active: 0,
            next_number: 1,
            canvas_width,
            canvas_height,
        };
        workspace.new_document();
        workspace
    }

    /// Rebuilds a workspace from restored documents.
    ///
    /// Falls back to a single blank document when `documents` is empty.
    pub fn from_documents(
        documents: Vec<Document>,
        active: usize,
        next_number: u32,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Self {
        if documents.is_empty() {
            return Self::new(canvas_width, canvas_height);
        }
        let active = active.min(documents.len() - 1);
        Self {
            next_number: next_number.max(documents.len() as u32 + 1),
            documents,
            active,
            canvas_width,
            canvas_height,
        }
    }

    /// Appends a blank document and makes it active. Returns its index.
    pub fn new_document(&mut self) -> usize {
        let title = format!("Image_{:03}", self.next_number);
        self.next_number += 1;
        debug!("Opening document '{}'", title);
        self.documents
            .push(Document::new(title, self.canvas_width, self.canvas_height));
        self.active = self.documents.len() - 1;
        self.active
    }

    /// Closes the document at `index`. The last document cannot be closed.
    pub fn close(&mut self, index: usize) -> bool {
        if self.documents.len() <= 1 || index >= self.documents.len() {
            return false;
        }
        let closed = self.documents.remove(index);
        debug!("Closed document '{}'", closed.title());
        if self.active > index || self.active >= self.documents.len() {
            self.active = self.active.saturating_sub(1);
        }
        true
    }

    /// Switches the active document. Returns false for an invalid index.
    pub fn activate(&mut self, index: usize) -> bool {
        if index >= self.documents.len() {
            return false;
        }
        self.active = index;
        true
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Document {
        &self.documents[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Document {
        &mut self.documents[self.active]
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Counter used for the next `Image_NNN` title.
    pub fn next_number(&self) -> u32 {
        self.next_number
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(super::DEFAULT_CANVAS_WIDTH, super::DEFAULT_CANVAS_HEIGHT)
    }
}
