//! Remap decision
//!
//! A pure function of (event, app). Equal inputs always give equal actions,
//! so a key-down and its paired key-up are rewritten the same way.

use crate::app::AppIdentity;
use crate::events::{Action, KeyEvent};

use super::filter::TargetFilter;
use super::table::RemapTable;

#[derive(Debug, Clone)]
pub struct RemapPolicy {
    filter: TargetFilter,
    table: RemapTable,
}

impl RemapPolicy {
    pub fn new(filter: TargetFilter, table: RemapTable) -> Self {
        Self { filter, table }
    }

    pub fn decide(&self, event: &KeyEvent, app: &AppIdentity) -> Action {
        if !self.filter.is_target(app) || !event.phase.is_keystroke() {
            return Action::PassThrough;
        }
        match self.table.lookup(event.key_code) {
            Some(new_key_code) => Action::Rewrite { new_key_code },
            None => Action::PassThrough,
        }
    }

    pub fn filter(&self) -> &TargetFilter {
        &self.filter
    }

    pub fn table(&self) -> &RemapTable {
        &self.table
    }
}
