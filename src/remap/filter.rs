//! Target application filter
//!
//! Remapping only applies while one of a fixed set of apps is in front.

use std::collections::HashSet;

use crate::app::AppIdentity;

pub const SAFARI: &str = "com.apple.Safari";
pub const CHROME: &str = "com.google.Chrome";
pub const FIREFOX: &str = "org.mozilla.firefox";
pub const BRAVE: &str = "com.brave.Browser";
pub const FINDER: &str = "com.apple.finder";

/// Bundle identifiers of the supported browsers
pub const BROWSERS: &[&str] = &[SAFARI, CHROME, FIREFOX, BRAVE];

/// Decides whether the foreground app is one remapping applies to
///
/// Matching is exact on the bundle identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFilter {
    targets: HashSet<String>,
}

impl TargetFilter {
    pub fn new<I, S>(bundle_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: bundle_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Browsers, plus Finder when `include_finder` is set
    #[cfg(test)]
    pub fn browsers(include_finder: bool) -> Self {
        let finder = include_finder.then_some(FINDER);
        Self::new(BROWSERS.iter().copied().chain(finder))
    }

    pub fn is_target(&self, app: &AppIdentity) -> bool {
        self.targets.contains(&app.bundle_identifier)
    }

    /// Target bundle ids, sorted for display
    pub fn bundle_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.targets.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
