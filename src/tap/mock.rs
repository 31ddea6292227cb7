//! Mock tap backend for unit testing.
//!
//! Stands in for the OS: tests deliver synthetic [`KeyEvent`]s and get back
//! what the OS would forward to applications.

use std::cell::Cell;

use super::{Delivery, EventHandler, TapBackend, TapError};
use crate::events::KeyEvent;

/// A mock implementation of [`TapBackend`]
pub struct MockTapBackend {
    handler: Option<EventHandler>,
    failure: Option<String>,
    installs: Cell<usize>,
    uninstalls: Cell<usize>,
}

impl MockTapBackend {
    pub fn new() -> Self {
        Self {
            handler: None,
            failure: None,
            installs: Cell::new(0),
            uninstalls: Cell::new(0),
        }
    }

    /// A backend whose registration is always refused
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::new()
        }
    }

    /// Deliver an event as the OS would.
    ///
    /// Without an installed tap the event reaches applications untouched.
    pub fn deliver(&self, event: KeyEvent) -> Option<KeyEvent> {
        let Some(handler) = &self.handler else {
            return Some(event);
        };
        match handler.delivery(event.clone()) {
            Delivery::Unchanged => Some(event),
            Delivery::SetKeyCode(key_code) => Some(event.with_key_code(key_code)),
            Delivery::Drop => None,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.handler.is_some()
    }

    pub fn install_count(&self) -> usize {
        self.installs.get()
    }

    pub fn uninstall_count(&self) -> usize {
        self.uninstalls.get()
    }
}

impl Default for MockTapBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TapBackend for MockTapBackend {
    fn install(&mut self, handler: EventHandler) -> Result<(), TapError> {
        self.installs.set(self.installs.get() + 1);
        if let Some(reason) = &self.failure {
            return Err(TapError::TapCreationFailed(reason.clone()));
        }
        self.handler = Some(handler);
        Ok(())
    }

    fn uninstall(&mut self) {
        self.uninstalls.set(self.uninstalls.get() + 1);
        self.handler = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppIdentity;
    use crate::events::Phase;
    use crate::tap::testing::{handler_for, FixedResolver};

    #[test]
    fn test_mock_passes_events_before_install() {
        let backend = MockTapBackend::new();
        let event = KeyEvent::new(14, Phase::Down);
        assert_eq!(backend.deliver(event.clone()), Some(event));
        assert!(!backend.is_installed());
    }

    #[test]
    fn test_mock_failing_install() {
        let mut backend = MockTapBackend::failing("no permission");
        let (handler, _rx) = handler_for(FixedResolver::new(AppIdentity::unknown()));
        assert!(backend.install(handler).is_err());
        assert!(!backend.is_installed());
        assert_eq!(backend.install_count(), 1);
    }
}
