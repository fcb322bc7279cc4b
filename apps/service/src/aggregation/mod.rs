/// Daily uptime aggregation
///
/// `outage` holds the pure interval extraction, `daily` builds the per-day
/// summary on top of it and keeps the stored row current.
pub mod daily;
pub mod outage;

pub use daily::{DailyAggregator, calculate_daily_summary, day_bounds};
pub use outage::{extract_outages, format_outage_periods, total_outage_duration, uptime_percentage};
