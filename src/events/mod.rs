//! Events module for tapped keystrokes
//!
//! Provides the key event as seen by the tap, the action the remap policy
//! chose for it, and the record handed to the logger.

use serde::{Deserialize, Serialize};

use crate::app::AppIdentity;
use crate::keys::{KeyCode, Modifiers};

/// Which part of a keystroke an event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Key pressed
    Down,
    /// Key released
    Up,
    /// Modifier state changed
    FlagsChanged,
    /// Any other event type, by raw CGEventType value
    Other(u32),
}

impl Phase {
    /// Map a raw CGEventType value
    pub fn from_event_type(raw: u32) -> Self {
        match raw {
            10 => Phase::Down,
            11 => Phase::Up,
            12 => Phase::FlagsChanged,
            other => Phase::Other(other),
        }
    }

    /// Whether the remap policy inspects this phase
    pub fn is_keystroke(&self) -> bool {
        matches!(self, Phase::Down | Phase::Up)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Down => write!(f, "KeyDown"),
            Phase::Up => write!(f, "KeyUp"),
            Phase::FlagsChanged => write!(f, "FlagsChanged"),
            Phase::Other(raw) => write!(f, "Event({})", raw),
        }
    }
}

/// A keyboard event as delivered to the tap
///
/// Events are never changed in place; a rewrite produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key_code: KeyCode,
    pub phase: Phase,
    pub modifiers: Modifiers,
    /// Unicode text the key produced, when the OS reports one
    pub character: Option<String>,
}

impl KeyEvent {
    pub fn new(key_code: KeyCode, phase: Phase) -> Self {
        Self {
            key_code,
            phase,
            modifiers: Modifiers::default(),
            character: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = Some(character.into());
        self
    }

    /// Copy of this event with a different key code
    pub fn with_key_code(&self, key_code: KeyCode) -> Self {
        Self {
            key_code,
            ..self.clone()
        }
    }

    /// The event that should continue down the delivery chain, or `None`
    /// when the action drops it
    pub fn apply(&self, action: Action) -> Option<KeyEvent> {
        match action {
            Action::PassThrough => Some(self.clone()),
            Action::Rewrite { new_key_code } => Some(self.with_key_code(new_key_code)),
            Action::Suppress => None,
        }
    }
}

/// What the tap does with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Deliver the event unchanged
    PassThrough,
    /// Deliver the event with its key code replaced
    Rewrite { new_key_code: KeyCode },
    /// Drop the event
    Suppress,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::PassThrough => write!(f, "PASS_THROUGH"),
            Action::Rewrite { new_key_code } => write!(f, "REWRITE ({})", new_key_code),
            Action::Suppress => write!(f, "SUPPRESS"),
        }
    }
}

/// One handled event, resolved and decided, on its way to the logger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapRecord {
    pub event: KeyEvent,
    pub app: AppIdentity,
    pub action: Action,
}
