//! Tap backend for hosts without CGEventTap

use super::{EventHandler, TapBackend, TapError};

/// Always refuses to register; remapping is macOS-only
#[derive(Debug, Default)]
pub struct UnsupportedBackend;

impl TapBackend for UnsupportedBackend {
    fn install(&mut self, _handler: EventHandler) -> Result<(), TapError> {
        Err(TapError::TapCreationFailed(format!(
            "event taps are not available on {}",
            std::env::consts::OS
        )))
    }

    fn uninstall(&mut self) {}
}
