/// Platform-agnostic input events.
///
/// The embedding window layer converts its native events into these and
/// feeds them to an [`InputProcessor`](super::InputProcessor), which maps
/// them to [`EngineCommand`](crate::EngineCommand) values. Cursor
/// positions are normalized device coordinates so the engine never sees
/// pixel units.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Cursor moved, in normalized device coordinates (both axes span
    /// [-1, 1], +y up).
    CursorMoved {
        /// Horizontal NDC position.
        x: f32,
        /// Vertical NDC position.
        y: f32,
    },
    /// Mouse button pressed or released.
    MouseButton {
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Scroll wheel (positive = zoom out).
    Scroll {
        /// Scroll amount in world-radius units.
        delta: f32,
    },
    /// A key was pressed. Key strings use the physical key-code format
    /// (`"KeyR"`, `"Space"`, `"Digit1"`, ...).
    KeyPressed {
        /// Physical key string.
        key: String,
    },
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Left,
    /// Secondary (right) mouse button.
    Right,
    /// Middle mouse button (wheel click).
    Middle,
}
