//! Keyboard modifier state tracking.

/// Keyboard modifier state.
///
/// Ctrl turns any tool into a temporary selection tool; Shift locks the
/// brush highlighter to a horizontal line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key pressed
    pub shift: bool,
    /// Ctrl key pressed
    pub ctrl: bool,
    /// Alt key pressed
    pub alt: bool,
}

impl Modifiers {
    /// Creates a new Modifiers instance with all keys released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer-down should pick primitives regardless of the active tool.
    pub fn forces_selection(&self) -> bool {
        self.ctrl
    }

    /// Freehand highlighter strokes stay on the starting row.
    pub fn locks_axis(&self) -> bool {
        self.shift
    }
}
