//! Outage interval extraction over a chronologically sorted day of checks.

use chrono::{NaiveTime, Timelike, TimeDelta};

use crate::database::models::{OutagePeriod, StatusCheck};

/// Closing boundary for an outage still open when the scanned range ends
pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// UTC time of day of a check, truncated to whole seconds
fn time_of_day(check: &StatusCheck) -> NaiveTime {
    let time = check.timestamp.time();
    time.with_nanosecond(0).unwrap_or(time)
}

/// Turn a sorted sequence of checks into outage intervals.
///
/// An interval opens at the first non-operational check of a run and closes
/// at the next operational check. A run still open at the end closes at
/// 23:59:59.
pub fn extract_outages(sorted_checks: &[StatusCheck]) -> Vec<OutagePeriod> {
    let mut periods = Vec::new();
    let mut open: Option<NaiveTime> = None;

    for check in sorted_checks {
        match (check.is_operational, open) {
            (false, None) => open = Some(time_of_day(check)),
            (true, Some(start)) => {
                periods.push(OutagePeriod { start, end: time_of_day(check) });
                open = None;
            }
            _ => {}
        }
    }

    if let Some(start) = open {
        periods.push(OutagePeriod { start, end: end_of_day() });
    }

    periods
}

/// `(total - failed) / total * 100`, rounded to two decimals; 0 for no checks
pub fn uptime_percentage(total_checks: u32, failed_checks: u32) -> f64 {
    if total_checks == 0 {
        return 0.0;
    }
    let up = total_checks.saturating_sub(failed_checks) as f64;
    round_two_decimals(up / total_checks as f64 * 100.0)
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Summed length of all outage periods
pub fn total_outage_duration(periods: &[OutagePeriod]) -> TimeDelta {
    periods.iter().map(|period| period.end - period.start).sum()
}

/// Human readable list of periods, e.g. `12:00:00 - 18:00:00, 20:00:00 - 23:59:59`
pub fn format_outage_periods(periods: &[OutagePeriod]) -> String {
    if periods.is_empty() {
        return "No outages".to_string();
    }
    periods.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn check(id: i64, hms: (u32, u32, u32), up: bool) -> StatusCheck {
        StatusCheck {
            id,
            service_id: Uuid::nil(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, hms.0, hms.1, hms.2).unwrap(),
            status_code: up.then_some(200),
            response_time: Some(100),
            is_operational: up,
            error: None,
        }
    }

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_single_recovered_outage() {
        let checks = vec![
            check(1, (0, 1, 0), true),
            check(2, (6, 0, 0), true),
            check(3, (12, 0, 0), false),
            check(4, (12, 5, 0), false),
            check(5, (18, 0, 0), true),
        ];

        assert_eq!(
            extract_outages(&checks),
            vec![OutagePeriod { start: t(12, 0, 0), end: t(18, 0, 0) }]
        );
    }

    #[test]
    fn test_outage_open_at_start_and_end() {
        let checks = vec![
            check(1, (0, 0, 30), false),
            check(2, (1, 0, 0), true),
            check(3, (20, 0, 0), false),
        ];

        assert_eq!(
            extract_outages(&checks),
            vec![
                OutagePeriod { start: t(0, 0, 30), end: t(1, 0, 0) },
                OutagePeriod { start: t(20, 0, 0), end: t(23, 59, 59) },
            ]
        );
    }

    #[test]
    fn test_no_outages() {
        let checks = vec![check(1, (1, 0, 0), true), check(2, (2, 0, 0), true)];
        assert!(extract_outages(&checks).is_empty());
        assert!(extract_outages(&[]).is_empty());
    }

    #[test]
    fn test_subsecond_timestamps_are_truncated() {
        let mut down = check(1, (9, 30, 15), false);
        down.timestamp += chrono::Duration::milliseconds(987);

        let periods = extract_outages(&[down]);
        assert_eq!(periods[0].start, t(9, 30, 15));
    }

    #[test]
    fn test_uptime_percentage() {
        assert_eq!(uptime_percentage(5, 2), 60.0);
        assert_eq!(uptime_percentage(3, 1), 66.67);
        assert_eq!(uptime_percentage(3, 2), 33.33);
        assert_eq!(uptime_percentage(4, 0), 100.0);
        assert_eq!(uptime_percentage(4, 4), 0.0);
        assert_eq!(uptime_percentage(0, 0), 0.0);
    }

    #[test]
    fn test_duration_and_formatting() {
        let periods = vec![
            OutagePeriod { start: t(12, 0, 0), end: t(18, 0, 0) },
            OutagePeriod { start: t(23, 0, 0), end: t(23, 59, 59) },
        ];

        assert_eq!(total_outage_duration(&periods).num_seconds(), 6 * 3600 + 3599);
        assert_eq!(total_outage_duration(&[]).num_seconds(), 0);
        assert_eq!(
            format_outage_periods(&periods),
            "12:00:00 - 18:00:00, 23:00:00 - 23:59:59"
        );
        assert_eq!(format_outage_periods(&[]), "No outages");
    }
}
