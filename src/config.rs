//! Configuration loading and management
//!
//! Target apps and remap rules are compiled in as presets; command-line
//! flags pick a preset and tune the trace output.

use clap::{Parser, ValueEnum};

use crate::keys::codes::{KEY_A, KEY_D, KEY_E, KEY_F, KEY_I, KEY_R, KEY_W};
use crate::logger::{LogFormat, Verbosity};
use crate::remap::filter::{BROWSERS, FINDER};
use crate::remap::{RemapError, RemapPolicy, RemapRule, RemapTable, TargetFilter};

/// Compiled-in remap setups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    /// Browsers: `e` types `f`
    #[default]
    #[value(name = "browser-e-to-f")]
    BrowserEToF,
    /// Browsers: `a` types `i`, `f` types `d`
    #[value(name = "browser-a-to-i")]
    BrowserAToI,
    /// Browsers and Finder: `r` types `w`
    #[value(name = "finder-r-to-w")]
    FinderRToW,
}

impl Preset {
    pub fn rules(&self) -> Vec<RemapRule> {
        match self {
            Preset::BrowserEToF => vec![RemapRule::new(KEY_E, KEY_F)],
            Preset::BrowserAToI => vec![RemapRule::new(KEY_A, KEY_I), RemapRule::new(KEY_F, KEY_D)],
            Preset::FinderRToW => vec![RemapRule::new(KEY_R, KEY_W)],
        }
    }

    pub fn includes_finder(&self) -> bool {
        matches!(self, Preset::FinderRToW)
    }
}

/// Command-line flags
#[derive(Debug, Parser)]
#[command(name = "keyremap-daemon", version, about = "Remap keys while selected apps are in front")]
pub struct Cli {
    /// Remap setup to use
    #[arg(long, value_enum, default_value_t = Preset::BrowserEToF)]
    pub preset: Preset,

    /// Also remap while Finder is in front
    #[arg(long)]
    pub include_finder: bool,

    /// Replace the preset rules; FROM and TO are key names (`e`, `1`, `Tab`)
    /// or raw key codes written `#14`
    #[arg(long = "map", value_name = "FROM=TO")]
    pub rules: Vec<RemapRule>,

    /// Trace detail per event
    #[arg(long, value_enum, default_value_t = Verbosity::Verbose)]
    pub verbosity: Verbosity,

    /// Trace encoding
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bundle identifiers remapping applies to
    pub target_apps: Vec<String>,

    /// Remap rules, one per source key code
    pub rules: Vec<RemapRule>,

    pub verbosity: Verbosity,

    pub log_format: LogFormat,
}

impl Config {
    /// Build the configuration from parsed flags
    pub fn from_cli(cli: &Cli) -> Self {
        let mut config = Self {
            verbosity: cli.verbosity,
            log_format: cli.log_format,
            ..Self::default()
        };

        if cli.include_finder || cli.preset.includes_finder() {
            config.target_apps.push(FINDER.to_string());
        }

        config.rules = if cli.rules.is_empty() {
            cli.preset.rules()
        } else {
            cli.rules.clone()
        };
        config
    }

    /// Build the remap policy, rejecting duplicate rules
    pub fn policy(&self) -> Result<RemapPolicy, RemapError> {
        let table = RemapTable::new(self.rules.iter().copied())?;
        Ok(RemapPolicy::new(
            TargetFilter::new(self.target_apps.iter().cloned()),
            table,
        ))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_apps: BROWSERS.iter().map(|id| id.to_string()).collect(),
            rules: Preset::default().rules(),
            verbosity: Verbosity::default(),
            log_format: LogFormat::default(),
        }
    }
}
