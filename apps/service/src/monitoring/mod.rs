/// Monitoring engine module - handles execution of monitoring checks
///
/// This module is responsible for:
/// - Probing service endpoints over HTTP(S)
/// - Recording each check and feeding the notifier and aggregator
/// - Scheduling ticks and the daily retention sweep
pub mod checker;
pub mod executor;
pub mod scheduler;
pub mod types;
pub mod validation;

pub use checker::{Checker, HttpChecker, ProbeError};
pub use executor::{CheckExecutor, CheckRun};
pub use scheduler::{MonitoringScheduler, SchedulerConfig, TickReport};
pub use types::{ProbeOutcome, ServiceState, is_operational_status};
