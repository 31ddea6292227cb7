//! Keyboard event tap
//!
//! Owns the OS interception point. Every key-down and key-up in the user
//! session passes through [`EventHandler`] before any application sees it,
//! and comes back out unchanged, rewritten, or dropped.
//!
//! The OS side sits behind [`TapBackend`] so the session lifecycle can be
//! driven without macOS in tests. Callbacks are dispatched by the main
//! thread's run loop, driven through [`MainLoop`].

mod handler;
mod main_loop;
mod session;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(test)]
pub mod mock;
#[cfg(not(target_os = "macos"))]
mod unsupported;

pub use handler::{Delivery, EventHandler};
pub use main_loop::MainLoop;
pub use session::{TapSession, TapState};

#[cfg(target_os = "macos")]
pub use macos::CgEventTapBackend as PlatformBackend;
#[cfg(not(target_os = "macos"))]
pub use unsupported::UnsupportedBackend as PlatformBackend;

#[cfg(test)]
pub(crate) use handler::testing;

/// OS interception point that feeds events to an [`EventHandler`]
pub trait TapBackend {
    /// Register the tap at the head of the session's delivery chain and
    /// start delivering key-down/key-up events to `handler`
    fn install(&mut self, handler: EventHandler) -> Result<(), TapError>;

    /// Unregister the tap. No callback runs after this returns.
    fn uninstall(&mut self);
}

/// Errors that can occur while managing the event tap
#[derive(Debug, thiserror::Error)]
pub enum TapError {
    #[error("failed to create event tap - check Accessibility and Input Monitoring permissions: {0}")]
    TapCreationFailed(String),

    #[error("event tap session is {state}")]
    InvalidState { state: TapState },
}
