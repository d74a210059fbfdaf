//! Drawing tool selection.

use super::events::CursorHint;
use crate::config::HighlighterMode;

/// Active editor tool.
///
/// The tool decides what a drag on empty canvas produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pick, move, resize and rotate primitives
    #[default]
    Select,
    /// Freehand stroke
    Pen,
    /// Translucent stroke or rectangle, see [`HighlighterMode`]
    Highlighter,
    Rect,
    Circle,
    Triangle,
    Diamond,
    Line,
    Arrow,
    /// Drag a box, then type
    Text,
    /// Numbered badge placed on click
    Stamp,
    /// Pixelate or blur a region
    Pixelate,
    /// Cut the canvas to a box
    Crop,
    /// Delete everything a box touches
    Eraser,
}

impl Tool {
    pub const ALL: [Tool; 14] = [
        Tool::Select,
        Tool::Pen,
        Tool::Highlighter,
        Tool::Rect,
        Tool::Circle,
        Tool::Triangle,
        Tool::Diamond,
        Tool::Line,
        Tool::Arrow,
        Tool::Text,
        Tool::Stamp,
        Tool::Pixelate,
        Tool::Crop,
        Tool::Eraser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Pen => "pen",
            Tool::Highlighter => "highlighter",
            Tool::Rect => "rect",
            Tool::Circle => "circle",
            Tool::Triangle => "triangle",
            Tool::Diamond => "diamond",
            Tool::Line => "line",
            Tool::Arrow => "arrow",
            Tool::Text => "text",
            Tool::Stamp => "stamp",
            Tool::Pixelate => "pixelate",
            Tool::Crop => "crop",
            Tool::Eraser => "eraser",
        }
    }

    /// Whether a drag with this tool records a point list.
    pub fn is_freehand(self, highlighter: HighlighterMode) -> bool {
        match self {
            Tool::Pen => true,
            Tool::Highlighter => highlighter == HighlighterMode::Brush,
            _ => false,
        }
    }

    /// Cursor while hovering empty canvas.
    pub fn cursor(self) -> CursorHint {
        match self {
            Tool::Select => CursorHint::Default,
            _ => CursorHint::Crosshair,
        }
    }
}

impl std::str::FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == lower)
            .ok_or_else(|| format!("Unknown tool: {}", s))
    }
}
