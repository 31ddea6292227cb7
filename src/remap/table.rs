//! Remap rules keyed by source key code

use std::collections::HashMap;
use std::str::FromStr;

use crate::keys::codes::{self, KeyCode};

/// Replace one key code with another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapRule {
    pub match_key_code: KeyCode,
    pub replacement_key_code: KeyCode,
}

impl RemapRule {
    pub const fn new(match_key_code: KeyCode, replacement_key_code: KeyCode) -> Self {
        Self {
            match_key_code,
            replacement_key_code,
        }
    }
}

impl std::fmt::Display for RemapRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let from = codes::display_name(self.match_key_code, None);
        let to = codes::display_name(self.replacement_key_code, None);
        write!(f, "'{}' will be changed to '{}'", from, to)
    }
}

/// Parses `FROM=TO`. Each side is a key name (`e`, `1`, `Tab`) or a raw
/// key code written `#14`; a bare number that names no key is also read as
/// a code.
impl FromStr for RemapRule {
    type Err = RemapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once('=')
            .ok_or_else(|| RemapError::InvalidRule(s.to_string()))?;
        Ok(Self::new(parse_key(from)?, parse_key(to)?))
    }
}

fn parse_key(side: &str) -> Result<KeyCode, RemapError> {
    let side = side.trim();
    let code = match side.strip_prefix('#') {
        Some(raw) => raw.trim().parse::<KeyCode>().ok(),
        None => codes::code_for_name(side).or_else(|| side.parse::<KeyCode>().ok()),
    };
    code.ok_or_else(|| RemapError::UnknownKey(side.to_string()))
}

/// Errors raised while building a remap table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemapError {
    #[error("key code {0} is remapped more than once")]
    DuplicateRule(KeyCode),

    #[error("invalid remap rule {0:?}, expected FROM=TO")]
    InvalidRule(String),

    #[error("unknown key {0:?}")]
    UnknownKey(String),
}

/// Immutable lookup of replacement codes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
    rules: HashMap<KeyCode, KeyCode>,
}

impl RemapTable {
    /// Build a table, rejecting two rules for the same source key
    pub fn new(rules: impl IntoIterator<Item = RemapRule>) -> Result<Self, RemapError> {
        let mut table = HashMap::new();
        for rule in rules {
            if table
                .insert(rule.match_key_code, rule.replacement_key_code)
                .is_some()
            {
                return Err(RemapError::DuplicateRule(rule.match_key_code));
            }
        }
        Ok(Self { rules: table })
    }

    pub fn lookup(&self, key_code: KeyCode) -> Option<KeyCode> {
        self.rules.get(&key_code).copied()
    }

    /// Rules sorted by source key code
    pub fn rules(&self) -> Vec<RemapRule> {
        let mut rules: Vec<RemapRule> = self
            .rules
            .iter()
            .map(|(from, to)| RemapRule::new(*from, *to))
            .collect();
        rules.sort_unstable_by_key(|rule| rule.match_key_code);
        rules
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
