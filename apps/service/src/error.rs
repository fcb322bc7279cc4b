use thiserror::Error;

/// Failures the monitoring loop swallows after logging them
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to record status check: {0:#}")]
    Persistence(anyhow::Error),

    #[error("failed to update daily summary: {0:#}")]
    Aggregation(anyhow::Error),

    #[error("failed to process status notification: {0:#}")]
    Notification(anyhow::Error),
}
