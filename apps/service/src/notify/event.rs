use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::{Service, StatusCheck};

/// Direction of a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    ServiceUp,
    ServiceDown,
}

impl TransitionKind {
    pub fn from_operational(is_operational: bool) -> Self {
        if is_operational { TransitionKind::ServiceUp } else { TransitionKind::ServiceDown }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionKind::ServiceUp => write!(f, "service_up"),
            TransitionKind::ServiceDown => write!(f, "service_down"),
        }
    }
}

/// Outbound notification, serialized as
/// `{service, type, statusCode, error, timestamp}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub service: String,
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StatusEvent {
    pub fn from_check(service: &Service, check: &StatusCheck, timestamp: DateTime<Utc>) -> Self {
        Self {
            service: service.name.clone(),
            kind: TransitionKind::from_operational(check.is_operational),
            status_code: check.status_code,
            error: check.error.clone(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_wire_shape() {
        let event = StatusEvent {
            service: "API".to_string(),
            kind: TransitionKind::ServiceDown,
            status_code: None,
            error: Some("connection refused".to_string()),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "service": "API",
                "type": "service_down",
                "statusCode": null,
                "error": "connection refused",
                "timestamp": "2025-06-01T12:00:00Z",
            })
        );
    }
}
