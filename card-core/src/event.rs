//! Input events for card editing.
//!
//! Pointer and touch coordinates are in displayed (CSS) pixels relative to
//! the surface's top-left corner; the editor converts them to logical units.

use serde::{Deserialize, Serialize};

/// Phase of a pointer (mouse) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
}

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled (e.g., palm rejection).
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in displayed pixels.
    pub x: f64,
    /// Y position in displayed pixels.
    pub y: f64,
}

/// A touch event with one or more touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    pub touches: Vec<TouchPoint>,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self { phase, touches }
    }

    /// Single-finger event at a point.
    #[must_use]
    pub fn single(phase: TouchPhase, x: f64, y: f64) -> Self {
        Self::new(phase, vec![TouchPoint { id: 0, x, y }])
    }

    /// Get the primary (first) touch point.
    ///
    /// Only this point is tracked; additional fingers are ignored.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Forward delete.
    Delete,
    /// Backspace.
    Backspace,
    /// Any other key, by its DOM `key` name.
    Other(String),
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Delete" => Self::Delete,
            "Backspace" => Self::Backspace,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether this is one of the four arrow keys.
    #[must_use]
    pub const fn is_arrow(&self) -> bool {
        matches!(
            self,
            Self::ArrowUp | Self::ArrowDown | Self::ArrowLeft | Self::ArrowRight
        )
    }

    /// Whether this key removes the selection.
    #[must_use]
    pub const fn is_delete(&self) -> bool {
        matches!(self, Self::Delete | Self::Backspace)
    }

    /// Offset applied by an arrow key for a given step.
    #[must_use]
    pub fn nudge(&self, step: f64) -> Option<(f64, f64)> {
        match self {
            Self::ArrowUp => Some((0.0, -step)),
            Self::ArrowDown => Some((0.0, step)),
            Self::ArrowLeft => Some((-step, 0.0)),
            Self::ArrowRight => Some((step, 0.0)),
            _ => None,
        }
    }

    /// Whether this is the given character key (case-insensitive).
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        match self {
            Self::Other(name) => {
                let mut chars = name.chars();
                matches!((chars.next(), chars.next()), (Some(k), None) if k.eq_ignore_ascii_case(&c))
            }
            _ => false,
        }
    }
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Pointer (mouse) event.
    Pointer {
        /// Phase of the event.
        phase: PointerPhase,
        /// X coordinate in displayed pixels.
        x: f64,
        /// Y coordinate in displayed pixels.
        y: f64,
    },

    /// Raw touch event.
    Touch(TouchEvent),

    /// Keyboard event.
    Key {
        /// Key pressed or released.
        key: Key,
        /// Whether the key is pressed.
        pressed: bool,
        /// Active modifier keys.
        modifiers: KeyModifiers,
    },
}

impl InputEvent {
    /// Pointer event helper.
    #[must_use]
    pub fn pointer(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self::Pointer { phase, x, y }
    }

    /// Key-down event without modifiers.
    #[must_use]
    pub fn key_down(key: Key) -> Self {
        Self::Key {
            key,
            pressed: true,
            modifiers: KeyModifiers::default(),
        }
    }

    /// Key-up event without modifiers.
    #[must_use]
    pub fn key_up(key: Key) -> Self {
        Self::Key {
            key,
            pressed: false,
            modifiers: KeyModifiers::default(),
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Control or Command, the platform shortcut modifier.
    #[must_use]
    pub const fn shortcut(&self) -> bool {
        self.ctrl || self.meta
    }
}
