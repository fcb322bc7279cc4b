use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use super::event::StatusEvent;
use super::sink::NotificationDispatcher;
use crate::database::models::{Service, StatusCheck};
use crate::database::Store;

/// Decide whether the newest check of `window` changes the service state.
///
/// `window` must be sorted ascending and end with the current check. Fewer
/// than two checks means there is nothing to compare against, which counts
/// as a transition out of the unknown state.
pub fn is_transition(window: &[StatusCheck], current_operational: bool) -> bool {
    match window.len() {
        0 | 1 => true,
        len => window[len - 2].is_operational != current_operational,
    }
}

/// Detects state transitions and announces them
pub struct ChangeNotifier {
    store: Arc<dyn Store>,
    dispatcher: Arc<NotificationDispatcher>,
    window: TimeDelta,
}

impl ChangeNotifier {
    pub fn new(store: Arc<dyn Store>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { store, dispatcher, window: TimeDelta::hours(1) }
    }

    /// Compare `check` with the service's history over the trailing hour and
    /// dispatch an event on a transition. The returned event is `None` when
    /// the state did not change.
    ///
    /// Only reading the history can fail; delivery problems are logged by
    /// the dispatcher.
    pub async fn process(
        &self,
        service: &Service,
        check: &StatusCheck,
        now: DateTime<Utc>,
    ) -> Result<Option<StatusEvent>> {
        let mut recent = self.store.query_checks(service.id, now - self.window, now).await?;
        recent.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

        if !is_transition(&recent, check.is_operational) {
            debug!(service = %service.name, "No status change");
            return Ok(None);
        }

        let event = StatusEvent::from_check(service, check, now);
        let report = self.dispatcher.dispatch(&event).await;
        debug!(
            service = %service.name,
            delivered = report.delivered,
            failed = report.failed,
            "Status change dispatched"
        );

        Ok(Some(event))
    }
}
