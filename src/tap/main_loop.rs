//! Main-thread run loop
//!
//! The tap callback and the NSWorkspace lookups it makes are serviced by
//! the main thread's run loop. `main` runs it; the async side stops it from
//! another thread through a cloned handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

/// Stop handle for the run loop that dispatches tap callbacks
#[derive(Debug, Clone)]
pub struct MainLoop {
    running: Arc<AtomicBool>,
}

impl MainLoop {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Run on the calling thread until [`MainLoop::stop`]. Returns at once
    /// if the loop was already stopped.
    pub fn run(&self) {
        info!("main run loop started");
        platform::run(&self.running);
        info!("main run loop stopped");
    }

    /// Ask the loop to return; callable from any thread
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        platform::wake();
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for MainLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "macos")]
mod platform {
    pub(super) use crate::tap::macos::{run_main_loop as run, wake_main_loop as wake};
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    const SLICE: Duration = Duration::from_millis(20);

    // Nothing is dispatched here; the loop only parks until stopped.
    pub(super) fn run(running: &AtomicBool) {
        while running.load(Ordering::SeqCst) {
            thread::sleep(SLICE);
        }
    }

    pub(super) fn wake() {}
}
