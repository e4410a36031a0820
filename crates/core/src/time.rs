//! Timestamp helpers for the fixed civil time zone slots are stored in.
//!
//! Stored timestamps carry no offset. Every parse and format goes through an
//! explicit [`Tz`] so nothing depends on the host's local zone.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::error::CoreError;

/// Literal layout of every persisted timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stand-in for a slot boundary that was never written.
pub const SENTINEL_TIMESTAMP: &str = "9999-12-31 09:00:00";

/// Last year [`TIMESTAMP_FORMAT`] renders as four digits.
pub const MAX_STORED_YEAR: i32 = 9999;

/// Hour a malformed slot start falls back to on the current day.
pub const FALLBACK_START_HOUR: u32 = 9;

/// Parse a stored timestamp as wall-clock time in `tz`.
///
/// Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant.
/// Times that do not exist in `tz` (DST spring-forward gap) are rejected.
pub fn parse_local(tz: Tz, value: &str) -> Result<DateTime<Tz>, CoreError> {
    let naive = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|e| {
        CoreError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })?;
    localize(tz, naive).ok_or_else(|| CoreError::InvalidTimestamp {
        value: value.to_string(),
        reason: format!("local time does not exist in {tz}"),
    })
}

pub fn format_local(dt: &DateTime<Tz>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

pub fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest()
}

/// Move `dt` by `delta` on the local wall clock, so a 09:00 window stays at
/// 09:00 across DST transitions. Falls back to absolute arithmetic when the
/// shifted wall-clock time does not exist.
///
/// A shift that would leave [`MAX_STORED_YEAR`] returns `dt` unchanged, so the
/// sentinel is written back as is.
pub fn shift_local(dt: &DateTime<Tz>, delta: TimeDelta) -> DateTime<Tz> {
    let Some(naive) = dt.naive_local().checked_add_signed(delta) else {
        return *dt;
    };
    if naive.year() > MAX_STORED_YEAR {
        return *dt;
    }
    localize(dt.timezone(), naive).unwrap_or(*dt + delta)
}

/// `now`'s calendar day at `hour`:00:00 in `now`'s zone.
pub fn today_at(now: &DateTime<Tz>, hour: u32) -> DateTime<Tz> {
    now.date_naive()
        .and_hms_opt(hour, 0, 0)
        .and_then(|naive| localize(now.timezone(), naive))
        .unwrap_or(*now)
}
