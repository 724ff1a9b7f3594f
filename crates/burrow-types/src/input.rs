//! Platform-agnostic key events.
//!
//! The terminal layer maps its native events to this enum; the input state
//! machine never sees raw terminal input.

/// One keypress, as consumed by the input state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character.
    Char(char),
    Enter,
    Backspace,
    Esc,
    /// Arrow up (scrolls one line).
    Up,
    /// Arrow down (scrolls one line).
    Down,
    /// Half-screen up (^U/^B or PageUp).
    PageUp,
    /// Half-screen down (^D/^F or PageDown).
    PageDown,
    /// Terminal was resized; repaint only.
    Resize,
    /// Hard quit (^C).
    Quit,
}
