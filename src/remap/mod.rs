//! Remap module
//!
//! Decides, per event, whether a keystroke is passed on, rewritten to a
//! different key code, or dropped:
//! - `filter`: which foreground apps remapping applies to
//! - `table`: source key code → replacement key code
//! - `policy`: the decision combining the two

pub mod filter;
mod policy;
mod table;

pub use filter::TargetFilter;
pub use policy::RemapPolicy;
pub use table::{RemapError, RemapRule, RemapTable};
