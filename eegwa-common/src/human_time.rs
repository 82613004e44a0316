//! Human-readable date and duration formatting
//!
//! Provides consistent display formatting for recording metadata. Backend timestamps
//! arrive either as RFC 3339 strings or as naive ISO strings (interpreted as UTC).

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a backend timestamp.
///
/// Accepts, in order:
/// - RFC 3339 with offset (`2020-11-03T15:58:51.532Z`)
/// - naive ISO date-time (`2020-11-03T15:58:51.532000`), taken as UTC
/// - bare date (`2020-11-03`), midnight UTC
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(Error::InvalidInput(format!("Unrecognised timestamp: '{}'", raw)))
}

/// Format as ISO calendar date (`YYYY-MM-DD`, UTC)
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Format as an RFC 1123 UTC string with the zone name stripped.
///
/// The trailing space left where `GMT` used to be is kept; list views rely on it
/// being byte-identical to what the web front end showed.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use eegwa_common::human_time::format_created;
///
/// let ts = Utc.with_ymd_and_hms(2020, 11, 3, 15, 58, 51).unwrap();
/// assert_eq!(format_created(&ts), "Tue, 03 Nov 2020 15:58:51 ");
/// ```
pub fn format_created(ts: &DateTime<Utc>) -> String {
    ts.format("%a, %d %b %Y %H:%M:%S ").to_string()
}

/// Epoch milliseconds of a backend timestamp (subject birthday updates)
pub fn epoch_millis(raw: &str) -> Result<i64> {
    Ok(parse_timestamp(raw)?.timestamp_millis())
}

/// Recording duration in seconds
pub fn duration_seconds(n_times: u64, sfreq: f64) -> f64 {
    n_times as f64 / sfreq
}

/// Format recording length as minutes and seconds.
///
/// - both parts non-zero: `"M min. S s"`
/// - under a minute: `"S s"`
/// - whole minutes: `"M min."`
///
/// Seconds keep their fractional part when the sample count is not a whole number of
/// seconds.
///
/// ```
/// use eegwa_common::human_time::format_duration;
///
/// assert_eq!(format_duration(15_000, 250.0), "1 min.");
/// assert_eq!(format_duration(20_000, 250.0), "1 min. 20 s");
/// assert_eq!(format_duration(5_000, 250.0), "20 s");
/// ```
pub fn format_duration(n_times: u64, sfreq: f64) -> String {
    let duration = duration_seconds(n_times, sfreq);
    let minutes = (duration / 60.0).floor();
    let seconds = duration % 60.0;

    if seconds != 0.0 && minutes != 0.0 {
        format!("{} min. {} s", minutes, seconds)
    } else if minutes == 0.0 {
        format!("{} s", seconds)
    } else {
        format!("{} min.", minutes)
    }
}
