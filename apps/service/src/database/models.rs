use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Service model - an HTTP endpoint probed on every tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to register a new service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
}

impl NewService {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into(), description: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// StatusCheck model - one recorded probe result, never mutated after insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheck {
    pub id: i64,
    pub service_id: Uuid,
    /// Instant the probe completed
    pub timestamp: DateTime<Utc>,
    pub status_code: Option<u16>,
    /// Wall-clock duration of the probe in milliseconds
    pub response_time: Option<u64>,
    pub is_operational: bool,
    pub error: Option<String>,
}

/// A probe result that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatusCheck {
    pub service_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub status_code: Option<u16>,
    pub response_time: Option<u64>,
    pub is_operational: bool,
    pub error: Option<String>,
}

impl NewStatusCheck {
    pub fn into_check(self, id: i64) -> StatusCheck {
        StatusCheck {
            id,
            service_id: self.service_id,
            timestamp: self.timestamp,
            status_code: self.status_code,
            response_time: self.response_time,
            is_operational: self.is_operational,
            error: self.error,
        }
    }
}

/// Tri-state health of a service over one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Green,
    Yellow,
    Red,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Green => "GREEN",
            HealthStatus::Yellow => "YELLOW",
            HealthStatus::Red => "RED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GREEN" => Some(HealthStatus::Green),
            "YELLOW" => Some(HealthStatus::Yellow),
            "RED" => Some(HealthStatus::Red),
            _ => None,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contiguous time-of-day span during which a service was down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutagePeriod {
    #[serde(with = "time_of_day")]
    pub start: NaiveTime,
    #[serde(with = "time_of_day")]
    pub end: NaiveTime,
}

impl std::fmt::Display for OutagePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format(time_of_day::FORMAT),
            self.end.format(time_of_day::FORMAT)
        )
    }
}

/// DailySummary model - one row per (service, UTC date), recomputed in full
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub uptime_percentage: f64,
    pub total_checks: u32,
    pub failed_checks: u32,
    pub outage_periods: Vec<OutagePeriod>,
    pub avg_response_time: u64,
    pub status: HealthStatus,
}

/// `HH:MM:SS` (de)serialization for outage boundaries
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M:%S";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
