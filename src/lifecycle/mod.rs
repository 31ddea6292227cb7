//! Process lifecycle
//!
//! Termination signals that end the daemon and stop the event tap.

mod shutdown;

pub use shutdown::ShutdownSignal;
