use crate::error::CliError;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};

/// Parses a `YYYY-MM-DD` calendar day.
pub fn parse_day(s: &str, label: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::usage(format!("Invalid {}: {}", label, s)))
}

/// Parses an RFC3339 timestamp with offset.
pub fn parse_timestamp(s: &str, label: &str) -> Result<DateTime<FixedOffset>, CliError> {
    let t = s.trim();
    if t.is_empty() {
        return Err(CliError::usage(format!("Invalid {}: (empty)", label)));
    }
    DateTime::parse_from_rfc3339(t)
        .map_err(|_| CliError::usage(format!("Invalid {}: {}", label, s)))
}

/// Calendar day of a timestamp under its own recorded offset. Time-of-day is
/// discarded; this is the day the event happened where it happened.
pub fn calendar_day(ts: &DateTime<FixedOffset>) -> NaiveDate {
    ts.date_naive()
}

/// Midnight UTC of a calendar day, as an RFC3339 timestamp. Used as the
/// deterministic default event time when `--today` pins the clock.
pub fn day_start_timestamp(day: NaiveDate) -> DateTime<FixedOffset> {
    let midnight = day.and_time(chrono::NaiveTime::MIN);
    DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc).fixed_offset()
}

pub fn previous_day(day: NaiveDate) -> Option<NaiveDate> {
    day.pred_opt()
}

pub fn system_today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn format_day(day: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", day.year(), day.month(), day.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_parse_validation() {
        assert!(parse_day("2026-01-31", "today").is_ok());
        assert!(parse_day("2026-02-29", "today").is_err());
        assert!(parse_day("2024-02-29", "today").is_ok());
        assert!(parse_day("2026-13-01", "today").is_err());
        assert!(parse_day("not-a-date", "today").is_err());
    }

    #[test]
    fn timestamp_day_uses_recorded_offset() {
        let ts = parse_timestamp("2026-01-31T23:30:00-05:00", "at").unwrap();
        assert_eq!(format_day(calendar_day(&ts)), "2026-01-31");

        let ts = parse_timestamp("2026-01-31T00:10:00+02:00", "at").unwrap();
        assert_eq!(format_day(calendar_day(&ts)), "2026-01-31");
    }

    #[test]
    fn day_start_round_trips_to_same_day() {
        let day = parse_day("2026-03-01", "d").unwrap();
        assert_eq!(calendar_day(&day_start_timestamp(day)), day);
    }

    #[test]
    fn previous_day_crosses_month_boundaries() {
        let day = parse_day("2026-03-01", "d").unwrap();
        assert_eq!(format_day(previous_day(day).unwrap()), "2026-02-28");
    }
}
