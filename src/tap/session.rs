//! Event tap session lifecycle
//!
//! Uninitialized → Active → Stopped. A session is started once and stopped
//! once per process run; stopping is idempotent.

use tracing::{debug, error, info, warn};

use super::{EventHandler, TapBackend, TapError};

/// Lifecycle state of a [`TapSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapState {
    /// Created, tap not registered yet
    #[default]
    Uninitialized,
    /// Tap registered and delivering events
    Active,
    /// Tap unregistered; terminal
    Stopped,
}

impl std::fmt::Display for TapState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TapState::Uninitialized => write!(f, "Uninitialized"),
            TapState::Active => write!(f, "Active"),
            TapState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Exclusive owner of the event tap
pub struct TapSession<B: TapBackend> {
    backend: B,
    state: TapState,
}

impl<B: TapBackend> TapSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: TapState::Uninitialized,
        }
    }

    pub fn state(&self) -> TapState {
        self.state
    }

    /// True only between a successful `start` and the following `stop`
    pub fn is_enabled(&self) -> bool {
        self.state == TapState::Active
    }

    /// Register the tap and begin remapping
    ///
    /// Fails with `InvalidState` if the session was already started (an
    /// active tap is left running), and with `TapCreationFailed` if the OS
    /// refuses the tap, in which case the session stays Uninitialized.
    /// Failures are not retried.
    pub fn start(&mut self, handler: EventHandler) -> Result<(), TapError> {
        if self.state != TapState::Uninitialized {
            warn!(state = %self.state, "event tap session already started");
            return Err(TapError::InvalidState { state: self.state });
        }

        if let Err(e) = self.backend.install(handler) {
            error!(error = %e, "event tap registration failed");
            return Err(e);
        }

        self.transition_to(TapState::Active);
        Ok(())
    }

    /// Unregister the tap. Calling this when not Active does nothing.
    pub fn stop(&mut self) {
        if self.state != TapState::Active {
            debug!(state = %self.state, "stop ignored, event tap not active");
            return;
        }

        self.backend.uninstall();
        self.transition_to(TapState::Stopped);
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn transition_to(&mut self, new_state: TapState) {
        info!(from = %self.state, to = %new_state, "event tap state transition");
        self.state = new_state;
    }
}

impl<B: TapBackend> Drop for TapSession<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
