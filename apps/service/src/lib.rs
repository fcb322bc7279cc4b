pub mod aggregation;
pub mod config;
pub mod database;
pub mod error;
pub mod monitoring;
pub mod notify;
pub mod pool;
pub mod retention;

#[cfg(test)]
mod testing;

use std::future::Future;
use std::io;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use config::Config;
use database::Store;
use monitoring::{CheckExecutor, HttpChecker, MonitoringScheduler};

/// Wire the production executor and scheduler for `store` from `config`
pub fn build_scheduler(config: &Config, store: Arc<dyn Store>) -> Result<MonitoringScheduler> {
    let checker = Arc::new(HttpChecker::new(config.request_timeout(), &config.monitoring.user_agent)?);
    let dispatcher = Arc::new(config.build_dispatcher()?);

    if dispatcher.is_empty() {
        info!("No notification sinks configured, status changes will only be logged");
    }

    let executor = CheckExecutor::new(
        checker,
        store.clone(),
        notify::ChangeNotifier::new(store.clone(), dispatcher),
        aggregation::DailyAggregator::new(store.clone()),
    );

    Ok(MonitoringScheduler::new(config.to_scheduler_config(), store, executor))
}

/// Cancel `token` once `signal` resolves. If listening for the signal fails,
/// the token is left alone and monitoring keeps running.
pub async fn cancel_on_signal(signal: impl Future<Output = io::Result<()>>, token: CancellationToken) {
    match signal.await {
        Ok(()) => {
            info!("Received Ctrl+C, stopping");
            token.cancel();
        }
        Err(e) => error!("Failed to listen for Ctrl+C, running without signal handling: {}", e),
    }
}
