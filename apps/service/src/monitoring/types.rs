use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{NewStatusCheck, StatusCheck};

/// A received response counts as operational for any 2xx or 3xx status
pub fn is_operational_status(status_code: u16) -> bool {
    (200..400).contains(&status_code)
}

/// Observed state of a service
///
/// `Unknown` only holds before the first check; afterwards a service moves
/// between `Operational` and `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Operational,
    Down,
    Unknown,
}

impl ServiceState {
    pub fn from_latest(check: Option<&StatusCheck>) -> Self {
        match check {
            Some(check) if check.is_operational => ServiceState::Operational,
            Some(_) => ServiceState::Down,
            None => ServiceState::Unknown,
        }
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceState::Operational => write!(f, "operational"),
            ServiceState::Down => write!(f, "down"),
            ServiceState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classified outcome of a single probe, before it is recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// HTTP status code, if a response was received
    pub status_code: Option<u16>,

    /// Time from request start to response completion or failure
    pub response_time_ms: u64,

    /// Transport error message (timeout, DNS, refused, TLS ...)
    pub error: Option<String>,
}

impl ProbeOutcome {
    /// A response was received with `status_code`
    pub fn response(status_code: u16, response_time_ms: u64) -> Self {
        Self { status_code: Some(status_code), response_time_ms, error: None }
    }

    /// No response was received
    pub fn failure(error: String, response_time_ms: u64) -> Self {
        Self { status_code: None, response_time_ms, error: Some(error) }
    }

    pub fn is_operational(&self) -> bool {
        self.error.is_none() && self.status_code.is_some_and(is_operational_status)
    }

    /// Attach the probe to a service and completion instant
    pub fn into_new_check(self, service_id: Uuid, timestamp: DateTime<Utc>) -> NewStatusCheck {
        NewStatusCheck {
            service_id,
            timestamp,
            is_operational: self.is_operational(),
            status_code: self.status_code,
            response_time: Some(self.response_time_ms),
            error: self.error,
        }
    }
}
