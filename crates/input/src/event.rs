/// Keys the harness reacts to. Window backends map their own key codes onto
/// this set and drop everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Space,
    Escape,
    F1,
}

/// A raw input signal reported by the window layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyPressed(Key),
    KeyReleased(Key),
    /// Absolute cursor position in window pixels, y growing downward.
    CursorMoved { x: f64, y: f64 },
    /// Vertical scroll amount; positive scrolls up / away from the user.
    Scroll { dy: f32 },
    /// The window lost keyboard focus; release events may never arrive.
    FocusLost,
}
