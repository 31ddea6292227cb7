//! Modifier key definitions
//!
//! Provides the macOS CGEventFlags masks for the four modifiers the daemon
//! reports, and a struct describing which of them were held for an event.

use serde::{Deserialize, Serialize};

/// Modifier flag masks from macOS CGEventFlags
pub mod flags {
    /// Shift key modifier flag
    pub const SHIFT: u64 = 0x0002_0000;
    /// Control key modifier flag
    pub const CONTROL: u64 = 0x0004_0000;
    /// Option/Alt key modifier flag
    pub const OPTION: u64 = 0x0008_0000;
    /// Command key modifier flag
    pub const COMMAND: u64 = 0x0010_0000;
}

/// Which modifier keys were held when an event was delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    /// Command key is held
    pub command: bool,
    /// Option/Alt key is held
    pub option: bool,
    /// Control key is held
    pub control: bool,
    /// Shift key is held
    pub shift: bool,
}

impl Modifiers {
    /// Create a new Modifiers value from raw CGEventFlags bits
    pub fn from_flags(bits: u64) -> Self {
        Self {
            command: bits & flags::COMMAND != 0,
            option: bits & flags::OPTION != 0,
            control: bits & flags::CONTROL != 0,
            shift: bits & flags::SHIFT != 0,
        }
    }

    /// Check if all modifiers are released
    pub fn is_empty(&self) -> bool {
        !self.command && !self.option && !self.control && !self.shift
    }

    /// Glyphs of the held modifiers, in Command, Option, Control, Shift order
    pub fn symbols(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.command, "⌘"),
            (self.option, "⌥"),
            (self.control, "⌃"),
            (self.shift, "⇧"),
        ]
        .into_iter()
        .filter_map(|(held, glyph)| held.then_some(glyph))
    }
}
