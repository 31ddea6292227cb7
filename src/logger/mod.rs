//! Event trace output
//!
//! Turns each [`TapRecord`] into human-readable lines on stdout. Records
//! arrive through a FIFO queue from the tap callback, so lines appear in the
//! order events were delivered.

use std::io::{self, Write};

use clap::ValueEnum;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::events::{Action, TapRecord};
use crate::keys::codes;

/// How much is printed per event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Verbosity {
    /// Event line, plus a notice for rewritten or dropped keys
    Concise,
    /// Also the modifier combination line and a separator
    #[default]
    Verbose,
}

/// Output encoding of the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EventLogger {
    verbosity: Verbosity,
    format: LogFormat,
}

impl EventLogger {
    pub fn new(verbosity: Verbosity, format: LogFormat) -> Self {
        Self { verbosity, format }
    }

    /// Text lines describing one record
    pub fn lines(&self, record: &TapRecord) -> Vec<String> {
        let TapRecord { event, app, action } = record;
        let character = event.character.as_deref().unwrap_or("");

        let mut lines = vec![format!(
            "{}:: {} :: {} :: {} - {}",
            app.display_name, app.bundle_identifier, event.phase, event.key_code, character
        )];

        if self.verbosity == Verbosity::Verbose && !event.modifiers.is_empty() {
            let key = codes::display_name(event.key_code, event.character.as_deref());
            let mut combo: Vec<&str> = event.modifiers.symbols().collect();
            combo.push(&key);
            lines.push(format!("Key Combination: {}", combo.join("+")));
            lines.push("================".to_string());
        }

        match action {
            Action::PassThrough => {}
            Action::Rewrite { new_key_code } => lines.push(format!(
                ">>>>>>>>>>  Modified Key: Changed '{}' to '{}'",
                codes::display_name(event.key_code, None),
                codes::display_name(*new_key_code, None)
            )),
            Action::Suppress => lines.push(format!(
                ">>>>>>>>>>  Suppressed Key: '{}'",
                codes::display_name(event.key_code, None)
            )),
        }

        lines
    }

    /// Write one record in the configured format
    pub fn log<W: Write>(&self, out: &mut W, record: &TapRecord) -> io::Result<()> {
        match self.format {
            LogFormat::Text => {
                for line in self.lines(record) {
                    writeln!(out, "{}", line)?;
                }
            }
            LogFormat::Json => {
                serde_json::to_writer(&mut *out, record)?;
                writeln!(out)?;
            }
        }
        out.flush()
    }

    /// Drain the record queue until every sender is gone
    ///
    /// Returns the number of records written.
    pub async fn run<W: Write>(self, mut records: mpsc::UnboundedReceiver<TapRecord>, mut out: W) -> u64 {
        info!(verbosity = ?self.verbosity, format = ?self.format, "event logger started");

        let mut written = 0;
        while let Some(record) = records.recv().await {
            match self.log(&mut out, &record) {
                Ok(()) => written += 1,
                Err(e) => warn!(error = %e, "failed to write event trace"),
            }
        }

        info!(records = written, "event logger stopped");
        written
    }
}
