//! Foreground application lookup
//!
//! Answers "which app will receive this keystroke?" for every event the tap
//! sees. Lookups never fail outward: any OS error degrades to a sentinel
//! identity so the input pipeline keeps moving.

#[cfg(target_os = "macos")]
mod macos;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(target_os = "macos")]
pub use macos::NsWorkspace;

/// Identity of the application that owns keyboard focus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    /// Localized display name
    pub display_name: String,
    /// Bundle identifier, never empty
    pub bundle_identifier: String,
}

impl AppIdentity {
    /// Returned when the OS could not be queried
    pub fn unknown() -> Self {
        Self::new("Unknown", "unknown")
    }

    /// Returned when the OS answered but no app claims focus (Spotlight and
    /// other system services)
    pub fn system_service() -> Self {
        Self::new("System Service", "com.apple.systemservice")
    }

    pub fn new(display_name: impl Into<String>, bundle_identifier: impl Into<String>) -> Self {
        let bundle_identifier = bundle_identifier.into();
        Self {
            display_name: display_name.into(),
            bundle_identifier: if bundle_identifier.is_empty() {
                "unknown".to_string()
            } else {
                bundle_identifier
            },
        }
    }
}

impl From<RunningApp> for AppIdentity {
    fn from(app: RunningApp) -> Self {
        Self::new(
            app.name.unwrap_or_else(|| "Unknown".to_string()),
            app.bundle_id.unwrap_or_default(),
        )
    }
}

/// Raw answer from the OS about one running application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningApp {
    pub name: Option<String>,
    pub bundle_id: Option<String>,
}

/// An OS query that could not be answered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionFailure {
    #[error("shared workspace is unavailable")]
    WorkspaceUnavailable,

    #[error("foreground app lookup is not supported on this platform")]
    Unsupported,
}

/// Source of the current foreground application
pub trait ForegroundAppResolver: Send {
    /// Resolve the app that owns keyboard focus right now
    fn resolve_foreground(&self) -> AppIdentity;
}

/// The three workspace lookups, in the order they are tried
///
/// Each call must be a bounded, local query: it runs inside the tap
/// callback while system input is held.
pub trait WorkspaceQuery: Send {
    /// The frontmost application
    fn frontmost(&self) -> Result<Option<RunningApp>, ResolutionFailure>;
    /// The application that owns the menu bar
    fn menu_bar_owner(&self) -> Result<Option<RunningApp>, ResolutionFailure>;
    /// The first running application flagged active
    fn first_active(&self) -> Result<Option<RunningApp>, ResolutionFailure>;
}

/// Resolver that walks the workspace lookups and falls back to sentinels
pub struct WorkspaceResolver<Q> {
    query: Q,
}

impl<Q: WorkspaceQuery> WorkspaceResolver<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }

    fn try_resolve(&self) -> Result<AppIdentity, ResolutionFailure> {
        if let Some(app) = self.query.frontmost()? {
            return Ok(app.into());
        }
        if let Some(app) = self.query.menu_bar_owner()? {
            return Ok(app.into());
        }
        if let Some(app) = self.query.first_active()? {
            return Ok(app.into());
        }
        Ok(AppIdentity::system_service())
    }
}

impl<Q: WorkspaceQuery> ForegroundAppResolver for WorkspaceResolver<Q> {
    fn resolve_foreground(&self) -> AppIdentity {
        self.try_resolve().unwrap_or_else(|e| {
            debug!(error = %e, "foreground app lookup failed");
            AppIdentity::unknown()
        })
    }
}

/// Workspace query for hosts without AppKit
#[cfg(not(target_os = "macos"))]
#[derive(Debug, Default)]
pub struct NoWorkspace;

#[cfg(not(target_os = "macos"))]
impl WorkspaceQuery for NoWorkspace {
    fn frontmost(&self) -> Result<Option<RunningApp>, ResolutionFailure> {
        Err(ResolutionFailure::Unsupported)
    }

    fn menu_bar_owner(&self) -> Result<Option<RunningApp>, ResolutionFailure> {
        Err(ResolutionFailure::Unsupported)
    }

    fn first_active(&self) -> Result<Option<RunningApp>, ResolutionFailure> {
        Err(ResolutionFailure::Unsupported)
    }
}

/// Resolver backed by the platform's workspace
pub fn platform_resolver() -> Box<dyn ForegroundAppResolver> {
    #[cfg(target_os = "macos")]
    {
        Box::new(WorkspaceResolver::new(NsWorkspace))
    }
    #[cfg(not(target_os = "macos"))]
    {
        Box::new(WorkspaceResolver::new(NoWorkspace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    type Answer = Result<Option<RunningApp>, ResolutionFailure>;

    /// Workspace with canned answers that counts how often it was asked
    struct ScriptedWorkspace {
        frontmost: Answer,
        menu_bar: Answer,
        active: Answer,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedWorkspace {
        fn new(frontmost: Answer, menu_bar: Answer, active: Answer) -> Self {
            Self {
                frontmost,
                menu_bar,
                active,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl WorkspaceQuery for ScriptedWorkspace {
        fn frontmost(&self) -> Answer {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.frontmost.clone()
        }

        fn menu_bar_owner(&self) -> Answer {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.menu_bar.clone()
        }

        fn first_active(&self) -> Answer {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.active.clone()
        }
    }

    fn app(name: &str, bundle: &str) -> Option<RunningApp> {
        Some(RunningApp {
            name: Some(name.to_string()),
            bundle_id: Some(bundle.to_string()),
        })
    }

    #[test]
    fn test_frontmost_wins() {
        let workspace = ScriptedWorkspace::new(
            Ok(app("Safari", "com.apple.Safari")),
            Ok(app("Finder", "com.apple.finder")),
            Ok(None),
        );
        let calls = Arc::clone(&workspace.calls);
        let resolved = WorkspaceResolver::new(workspace).resolve_foreground();
        assert_eq!(resolved, AppIdentity::new("Safari", "com.apple.Safari"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_menu_bar_owner_fallback() {
        let workspace = ScriptedWorkspace::new(
            Ok(None),
            Ok(app("Finder", "com.apple.finder")),
            Ok(app("Safari", "com.apple.Safari")),
        );
        let resolved = WorkspaceResolver::new(workspace).resolve_foreground();
        assert_eq!(resolved.bundle_identifier, "com.apple.finder");
    }

    #[test]
    fn test_active_scan_fallback() {
        let workspace =
            ScriptedWorkspace::new(Ok(None), Ok(None), Ok(app("Terminal", "com.apple.Terminal")));
        let resolved = WorkspaceResolver::new(workspace).resolve_foreground();
        assert_eq!(resolved.display_name, "Terminal");
    }

    #[test]
    fn test_nothing_focused_is_system_service() {
        let workspace = ScriptedWorkspace::new(Ok(None), Ok(None), Ok(None));
        let resolved = WorkspaceResolver::new(workspace).resolve_foreground();
        assert_eq!(resolved, AppIdentity::system_service());
    }

    #[test]
    fn test_query_failure_is_unknown() {
        let workspace = ScriptedWorkspace::new(
            Err(ResolutionFailure::WorkspaceUnavailable),
            Ok(app("Finder", "com.apple.finder")),
            Ok(None),
        );
        let calls = Arc::clone(&workspace.calls);
        let resolved = WorkspaceResolver::new(workspace).resolve_foreground();
        assert_eq!(resolved, AppIdentity::unknown());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let workspace = ScriptedWorkspace::new(Ok(Some(RunningApp::default())), Ok(None), Ok(None));
        let resolved = WorkspaceResolver::new(workspace).resolve_foreground();
        assert_eq!(resolved.display_name, "Unknown");
        assert_eq!(resolved.bundle_identifier, "unknown");
    }

    #[test]
    fn test_bundle_identifier_never_empty() {
        assert_eq!(AppIdentity::new("X", "").bundle_identifier, "unknown");
    }
}
