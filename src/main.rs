//! keyremap-daemon: per-application keyboard remapping for macOS
//!
//! This daemon runs as a LaunchAgent and provides:
//! - A session-wide CGEventTap that sees every key-down and key-up first
//! - Foreground app lookup for each keystroke
//! - Key code rewriting while a target app (browsers, optionally Finder)
//!   is in front
//! - A human-readable trace of every event on stdout
//!
//! Requires Accessibility / Input Monitoring permission.

mod app;
mod config;
mod events;
mod keys;
mod lifecycle;
mod logger;
mod remap;
mod tap;

use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Config};
use crate::events::TapRecord;
use crate::lifecycle::ShutdownSignal;
use crate::logger::EventLogger;
use crate::tap::{EventHandler, MainLoop, PlatformBackend, TapSession};

// The main thread owns the event tap and runs the run loop that dispatches
// its callbacks; NSWorkspace only tracks the frontmost app while that loop
// runs. Tokio (event logger, signal wait) lives on a background thread.
fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout carries the event trace
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "keyremap-daemon starting"
    );

    let config = Config::from_cli(&cli);
    let policy = config.policy().context("invalid remap rules")?;

    let targets: Vec<String> = policy
        .filter()
        .bundle_ids()
        .into_iter()
        .map(String::from)
        .collect();
    let rules = policy.table().rules();

    // Tap callback -> event logger
    let (record_tx, record_rx) = mpsc::unbounded_channel();
    let handler = EventHandler::new(app::platform_resolver(), policy, record_tx);

    let mut session = TapSession::new(PlatformBackend::default());
    if let Err(e) = session.start(handler) {
        error!(error = %e, "failed to start keyboard monitoring");
        warn!("remapping is disabled - grant Input Monitoring permission and restart");
        return Ok(());
    }

    info!(?targets, "target applications");
    for rule in &rules {
        info!("{} in target applications", rule);
    }
    if rules.is_empty() {
        warn!("no remap rules configured, events will only be traced");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let main_loop = MainLoop::new();
    let logger = EventLogger::new(config.verbosity, config.log_format);
    let remote = main_loop.clone();
    let async_side = thread::Builder::new()
        .name("runtime".to_string())
        .spawn(move || runtime.block_on(serve(logger, record_rx, remote)))
        .context("failed to spawn runtime thread")?;

    info!(
        enabled = session.is_enabled(),
        "keyboard monitoring started, press Ctrl+C to quit"
    );
    main_loop.run();

    // Cleanup
    info!("shutting down...");

    // Releases the record sender, letting the logger drain and finish
    session.stop();
    info!(state = %session.state(), "event tap session closed");

    match async_side.join() {
        Ok(written) => info!(records = written, "keyremap-daemon stopped"),
        Err(_) => error!("runtime thread panicked"),
    }

    Ok(())
}

/// Async side: print records until shutdown, then stop the main run loop
/// and wait for the logger to drain what the tap queued.
async fn serve(
    logger: EventLogger,
    records: mpsc::UnboundedReceiver<TapRecord>,
    main_loop: MainLoop,
) -> u64 {
    let shutdown = ShutdownSignal::new();
    let mut logger_task = tokio::spawn(logger.run(records, std::io::stdout()));

    tokio::select! {
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
        result = &mut logger_task => {
            warn!("event tap stopped delivering events");
            main_loop.stop();
            return result.unwrap_or_else(|e| {
                error!(?e, "event logger task failed");
                0
            });
        }
    }

    main_loop.stop();

    match logger_task.await {
        Ok(written) => written,
        Err(e) => {
            error!(?e, "event logger task failed");
            0
        }
    }
}
