//! Generic input event types shared with the host.

/// Generic key representation.
///
/// Hosts map their native key codes to these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    Escape,
    Return,
    Backspace,
    Delete,
    Tab,
    Space,
    /// Shift modifier
    Shift,
    /// Ctrl modifier (Cmd on macOS hosts)
    Ctrl,
    /// Alt modifier
    Alt,
    /// Unmapped or unrecognized key
    Unknown,
}

impl Key {
    /// Name used in keybinding strings, e.g. "Z" or "Delete".
    ///
    /// Modifier and unknown keys have no binding name.
    pub fn binding_name(self) -> Option<String> {
        let name = match self {
            Key::Char(c) => return Some(c.to_string()),
            Key::Escape => "Escape",
            Key::Return => "Return",
            Key::Backspace => "Backspace",
            Key::Delete => "Delete",
            Key::Tab => "Tab",
            Key::Space => "Space",
            Key::Shift | Key::Ctrl | Key::Alt | Key::Unknown => return None,
        };
        Some(name.to_string())
    }
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button: draws, selects, drags
    Left,
    /// Cancels an in-progress gesture
    Right,
    Middle,
}

/// Pointer cursor the host should show over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    /// Drawing tools
    Crosshair,
    /// North/south edge handles
    ResizeNs,
    /// East/west edge handles
    ResizeEw,
    /// North-west / south-east corners
    ResizeNwse,
    /// North-east / south-west corners
    ResizeNesw,
    /// Rotation knob
    Rotate,
}
