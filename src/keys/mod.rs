//! Key codes and modifier flags
//!
//! Static lookup data for turning macOS key events into readable text.

pub mod codes;
mod modifiers;

pub use codes::KeyCode;
pub use modifiers::Modifiers;
