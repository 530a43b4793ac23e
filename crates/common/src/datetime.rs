//! Reporting-timezone date handling.
//!
//! Report periods are anchored to the civil calendar of the operations team,
//! a fixed UTC+3 offset with no daylight saving. All instants stay `Utc`
//! internally; this module owns the conversion at the period and display
//! boundaries.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use once_cell::sync::Lazy;

/// Display format for dates in artifact names, `dd.mm.YYYY`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Display format for timestamps in report cells, `dd.mm.YYYY HH:MM:SS`.
pub const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

const REPORTING_OFFSET_SECS: i32 = 3 * 3600;

static REPORTING_TZ: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(REPORTING_OFFSET_SECS).expect("offset within bounds"));

/// The fixed civil timezone report periods are expressed in.
pub fn reporting_tz() -> FixedOffset {
    *REPORTING_TZ
}

/// Midnight of the instant's civil day in the reporting timezone, as UTC.
pub fn reporting_midnight(at: DateTime<Utc>) -> DateTime<Utc> {
    let tz = reporting_tz();
    let local_day = at.with_timezone(&tz).date_naive();
    let naive_utc =
        local_day.and_time(NaiveTime::MIN) - Duration::seconds(i64::from(tz.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(naive_utc, Utc)
}

/// Number of whole days between two instants; negative when `end < start`.
pub fn whole_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_days()
}

/// Format an instant as a civil date in the reporting timezone.
pub fn format_local_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&reporting_tz()).format(DATE_FORMAT).to_string()
}

/// Format an instant as a civil timestamp in the reporting timezone.
pub fn format_local_datetime(at: DateTime<Utc>) -> String {
    at.with_timezone(&reporting_tz()).format(DATE_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn midnight_of_a_utc_midnight_stays_on_the_same_civil_day() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let midnight = reporting_midnight(at);

        // 2026-03-02T00:00Z is 03:00 local; local midnight is 21:00Z the day before.
        assert_eq!(midnight, Utc.with_ymd_and_hms(2026, 3, 1, 21, 0, 0).unwrap());
        assert_eq!(format_local_date(midnight), "02.03.2026");
    }

    #[test]
    fn late_utc_evening_rolls_into_the_next_civil_day() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 22, 30, 0).unwrap();
        assert_eq!(format_local_date(reporting_midnight(at)), "03.03.2026");
    }

    #[test]
    fn whole_days_is_signed() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();

        assert_eq!(whole_days(start, end), 3);
        assert_eq!(whole_days(end, start), -3);
    }

    #[test]
    fn local_datetime_format_matches_contract() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 6, 15, 9).unwrap();
        assert_eq!(format_local_datetime(at), "02.03.2026 09:15:09");
    }
}
