//! Per-event pipeline run inside the tap callback
//!
//! Resolve the foreground app, ask the policy, hand the record to the
//! logger. Nothing here blocks: the record queue is unbounded and the
//! resolver only makes local OS calls.

use tokio::sync::mpsc;
use tracing::trace;

use crate::app::ForegroundAppResolver;
use crate::events::{Action, KeyEvent, TapRecord};
use crate::keys::KeyCode;
use crate::remap::RemapPolicy;

/// What the backend does to the OS event it was handed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Forward the event as received
    Unchanged,
    /// Overwrite the event's key code field, then forward it
    SetKeyCode(KeyCode),
    /// Return nothing so the OS drops the event
    Drop,
}

impl Delivery {
    /// Compare the event with what `action` turns it into
    pub fn for_action(event: &KeyEvent, action: Action) -> Self {
        match event.apply(action) {
            Some(out) if out.key_code != event.key_code => Delivery::SetKeyCode(out.key_code),
            Some(_) => Delivery::Unchanged,
            None => Delivery::Drop,
        }
    }
}

pub struct EventHandler {
    resolver: Box<dyn ForegroundAppResolver>,
    policy: RemapPolicy,
    records: mpsc::UnboundedSender<TapRecord>,
}

impl EventHandler {
    pub fn new(
        resolver: Box<dyn ForegroundAppResolver>,
        policy: RemapPolicy,
        records: mpsc::UnboundedSender<TapRecord>,
    ) -> Self {
        Self {
            resolver,
            policy,
            records,
        }
    }

    /// Decide what happens to one delivered event
    pub fn handle(&self, event: KeyEvent) -> Action {
        let app = self.resolver.resolve_foreground();
        let action = self.policy.decide(&event, &app);

        trace!(
            key_code = event.key_code,
            phase = %event.phase,
            app = %app.bundle_identifier,
            %action,
            "key event handled"
        );

        if self.records.send(TapRecord { event, app, action }).is_err() {
            trace!("event logger is gone, record dropped");
        }
        action
    }

    /// Handle an event and say how the OS event must be changed
    pub fn delivery(&self, event: KeyEvent) -> Delivery {
        let action = self.handle(event.clone());
        Delivery::for_action(&event, action)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::app::AppIdentity;
    use crate::events::Phase;
    use crate::keys::codes::{KEY_E, KEY_F};

    #[test]
    fn test_rewrite_in_target_app() {
        let resolver = FixedResolver::new(AppIdentity::new("Safari", "com.apple.Safari"));
        let (handler, mut rx) = handler_for(resolver);

        let action = handler.handle(KeyEvent::new(KEY_E, Phase::Down));
        assert_eq!(action, Action::Rewrite { new_key_code: KEY_F });

        let record = rx.try_recv().unwrap();
        assert_eq!(record.event.key_code, KEY_E);
        assert_eq!(record.app.bundle_identifier, "com.apple.Safari");
        assert_eq!(record.action, action);
    }

    #[test]
    fn test_app_resolved_per_event() {
        let resolver = FixedResolver::new(AppIdentity::new("Safari", "com.apple.Safari"));
        let (handler, mut rx) = handler_for(resolver.clone());

        assert!(matches!(
            handler.handle(KeyEvent::new(KEY_E, Phase::Down)),
            Action::Rewrite { .. }
        ));
        resolver.set(AppIdentity::new("TextEdit", "com.apple.TextEdit"));
        assert_eq!(
            handler.handle(KeyEvent::new(KEY_E, Phase::Down)),
            Action::PassThrough
        );

        assert_eq!(rx.try_recv().unwrap().app.display_name, "Safari");
        assert_eq!(rx.try_recv().unwrap().app.display_name, "TextEdit");
    }

    #[test]
    fn test_delivery_for_each_action() {
        let event = KeyEvent::new(KEY_E, Phase::Down);
        assert_eq!(
            Delivery::for_action(&event, Action::PassThrough),
            Delivery::Unchanged
        );
        assert_eq!(
            Delivery::for_action(&event, Action::Rewrite { new_key_code: KEY_F }),
            Delivery::SetKeyCode(KEY_F)
        );
        assert_eq!(Delivery::for_action(&event, Action::Suppress), Delivery::Drop);
    }

    #[test]
    fn test_rewrite_to_same_code_leaves_event_alone() {
        let event = KeyEvent::new(KEY_E, Phase::Up);
        assert_eq!(
            Delivery::for_action(&event, Action::Rewrite { new_key_code: KEY_E }),
            Delivery::Unchanged
        );
    }

    #[test]
    fn test_handler_delivery_down_and_up_match() {
        let resolver = FixedResolver::new(AppIdentity::new("Safari", "com.apple.Safari"));
        let (handler, mut rx) = handler_for(resolver.clone());

        assert_eq!(
            handler.delivery(KeyEvent::new(KEY_E, Phase::Down)),
            Delivery::SetKeyCode(KEY_F)
        );
        assert_eq!(
            handler.delivery(KeyEvent::new(KEY_E, Phase::Up)),
            Delivery::SetKeyCode(KEY_F)
        );
        assert_eq!(
            handler.delivery(KeyEvent::new(0, Phase::Down)),
            Delivery::Unchanged
        );

        resolver.set(AppIdentity::new("TextEdit", "com.apple.TextEdit"));
        assert_eq!(
            handler.delivery(KeyEvent::new(KEY_E, Phase::Down)),
            Delivery::Unchanged
        );

        // one record per delivered event, original key code kept
        let codes: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|record| record.event.key_code)
            .collect();
        assert_eq!(codes, vec![KEY_E, KEY_E, 0, KEY_E]);
    }

    #[test]
    fn test_closed_logger_does_not_affect_decision() {
        let resolver = FixedResolver::new(AppIdentity::new("Safari", "com.apple.Safari"));
        let (handler, rx) = handler_for(resolver);
        drop(rx);
        assert_eq!(
            handler.handle(KeyEvent::new(KEY_E, Phase::Up)),
            Action::Rewrite { new_key_code: KEY_F }
        );
    }
}
