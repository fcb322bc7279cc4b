use std::sync::Arc;
use std::time::Instant;

use chrono::{SubsecRound, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::checker::Checker;
use super::types::ProbeOutcome;
use crate::aggregation::DailyAggregator;
use crate::database::models::{Service, StatusCheck};
use crate::database::Store;
use crate::error::MonitorError;
use crate::notify::ChangeNotifier;

/// Result of a cancellable check
#[derive(Debug)]
pub enum CheckRun {
    Recorded(StatusCheck),
    /// Probed, but the check could not be persisted
    NotRecorded,
    /// Cancelled before the probe completed; nothing was written
    Cancelled,
}

/// Check executor - probes one service and runs everything that follows
pub struct CheckExecutor {
    checker: Arc<dyn Checker>,
    store: Arc<dyn Store>,
    notifier: ChangeNotifier,
    aggregator: DailyAggregator,
}

impl CheckExecutor {
    pub fn new(
        checker: Arc<dyn Checker>,
        store: Arc<dyn Store>,
        notifier: ChangeNotifier,
        aggregator: DailyAggregator,
    ) -> Self {
        Self { checker, store, notifier, aggregator }
    }

    /// Probe `service` and classify the result. Never fails: transport
    /// errors become a non-operational outcome.
    pub async fn probe(&self, service: &Service) -> ProbeOutcome {
        let start = Instant::now();
        let result = self.checker.probe(&service.url).await;
        let elapsed = start.elapsed().as_millis() as u64;

        match result {
            Ok(status_code) => {
                info!(
                    service = %service.name,
                    status_code,
                    response_time_ms = elapsed,
                    "Service responded"
                );
                ProbeOutcome::response(status_code, elapsed)
            }
            Err(e) => {
                warn!(service = %service.name, url = %service.url, "Probe failed: {}", e);
                ProbeOutcome::failure(e.to_string(), elapsed)
            }
        }
    }

    /// Probe, record, then notify and aggregate.
    ///
    /// Returns `None` when the check could not be recorded; notification and
    /// aggregation are skipped in that case. Failures of either follow-up
    /// step are logged and do not affect the returned check.
    pub async fn execute_check(&self, service: &Service) -> Option<StatusCheck> {
        let outcome = self.probe(service).await;
        self.record(service, outcome).await
    }

    /// Like [`execute_check`](Self::execute_check), but gives up while the
    /// probe is in flight if `cancel` fires. Once the check is persisted,
    /// notification and aggregation always run to completion.
    pub async fn execute_check_until(
        &self,
        service: &Service,
        cancel: &CancellationToken,
    ) -> CheckRun {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return CheckRun::Cancelled,
            outcome = self.probe(service) => outcome,
        };

        match self.record(service, outcome).await {
            Some(check) => CheckRun::Recorded(check),
            None => CheckRun::NotRecorded,
        }
    }

    /// Persist `outcome`, then notify and aggregate
    pub async fn record(&self, service: &Service, outcome: ProbeOutcome) -> Option<StatusCheck> {
        let new_check = outcome.into_new_check(service.id, Utc::now().trunc_subsecs(3));

        let check = match self.store.create_status_check(&new_check).await {
            Ok(check) => check,
            Err(e) => {
                error!(service = %service.name, "{}", MonitorError::Persistence(e));
                return None;
            }
        };

        let now = Utc::now();

        if let Err(e) = self.notifier.process(service, &check, now).await {
            warn!(service = %service.name, "{}", MonitorError::Notification(e));
        }

        if let Err(e) = self.aggregator.update(service.id, now).await {
            error!(service = %service.name, "{}", MonitorError::Aggregation(e));
        }

        Some(check)
    }
}
