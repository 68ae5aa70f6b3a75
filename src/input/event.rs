//! Raw key events as delivered by the host platform.
//!
//! The host (browser shell, desktop shell, test harness) translates its
//! native key events into [`InputEvent`]s and feeds them to the gate. Events
//! carry their own timestamp so throttling is deterministic and replayable -
//! the gate never consults a clock of its own.

use std::time::Instant;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// The key carried by an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A printable character key (letters, digits, punctuation).
    Char(char),
    /// The Backspace key.
    Backspace,
    /// The Enter / Return key.
    Enter,
    /// The space bar.
    Space,
    /// Any other named key ("ArrowLeft", "F5", "Tab", …).
    Other(String),
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier keys held during an input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        meta: false,
        shift: false,
    };

    /// Ctrl+Shift held - the chord used by the global control combos.
    pub const CTRL_SHIFT: Self = Self {
        ctrl: true,
        alt: false,
        meta: false,
        shift: true,
    };

    /// Whether a platform modifier (ctrl/alt/meta) is held. Shift alone is
    /// ordinary typing (capital letters).
    pub fn has_platform_modifier(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// A single raw keystroke: key, modifiers and arrival time.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub at: Instant,
}

impl InputEvent {
    pub fn new(key: Key, modifiers: Modifiers, at: Instant) -> Self {
        Self { key, modifiers, at }
    }

    /// Convenience constructor for an unmodified character key.
    pub fn character(c: char, at: Instant) -> Self {
        Self::new(Key::Char(c), Modifiers::NONE, at)
    }

    /// Convenience constructor for an unmodified non-character key.
    pub fn key(key: Key, at: Instant) -> Self {
        Self::new(key, Modifiers::NONE, at)
    }
}
