//! Audit timestamps rendered as `YYYY-MM-DD HH:MM:SS` (UTC).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current UTC time as an audit timestamp.
pub fn now() -> String {
    format_timestamp(SystemTime::now())
}

/// Format a point in time as an audit timestamp. Times before the epoch clamp to it.
pub fn format_timestamp(t: SystemTime) -> String {
    format_since_epoch(t.duration_since(UNIX_EPOCH).unwrap_or_default())
}

fn format_since_epoch(since_epoch: Duration) -> String {
    let secs = since_epoch.as_secs();
    let (year, month, day) = civil_date(secs / 86_400);
    let tod = secs % 86_400;
    format!(
        "{year:04}-{month:02}-{day:02} {:02}:{:02}:{:02}",
        tod / 3600,
        (tod / 60) % 60,
        tod % 60
    )
}

/// Proleptic Gregorian (year, month, day) for a count of days since 1970-01-01.
///
/// Works in 400-year eras counted from 0000-03-01, so February is the last
/// month of each shifted year and leap days need no special case.
fn civil_date(days: u64) -> (u64, u64, u64) {
    const DAYS_PER_ERA: u64 = 146_097;
    // 0000-03-01 to 1970-01-01
    const EPOCH_SHIFT: u64 = 719_468;

    let z = days + EPOCH_SHIFT;
    let era = z / DAYS_PER_ERA;
    let day_of_era = z % DAYS_PER_ERA;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * shifted_month + 2) / 5 + 1;
    let month = if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    };
    let year = era * 400 + year_of_era + u64::from(month <= 2);
    (year, month, day)
}
