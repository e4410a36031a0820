//! Typed view over slot entries in the `slots` mapping of the settings document.
//!
//! Slots are read leniently: missing or malformed fields degrade to defaults
//! rather than rejecting the entry, so one bad slot never blocks the others.

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use serde_json::Value;

use crate::time::{parse_local, shift_local, today_at, FALLBACK_START_HOUR, SENTINEL_TIMESTAMP};

/// Document holding the `slots` mapping.
pub const SETTINGS_PATH: &str = "settings";
pub const SLOTS_FIELD: &str = "slots";

pub const ENABLED_FIELD: &str = "enabled";
pub const SLOT_START_FIELD: &str = "slot_start";
pub const SLOT_END_FIELD: &str = "slot_end";
pub const FREQUENCY_FIELD: &str = "frequency";
pub const LAST_UPDATE_FIELD: &str = "last_update";

/// How far a slot's window moves on each shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    #[default]
    Daily,
    ThreeDay,
}

impl Frequency {
    /// Case-insensitive; anything other than `3day` is daily.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("3day") {
            Frequency::ThreeDay
        } else {
            Frequency::Daily
        }
    }

    pub fn from_value(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_str)
            .map(Self::parse)
            .unwrap_or_default()
    }

    pub fn period(self) -> TimeDelta {
        match self {
            Frequency::Daily => TimeDelta::days(1),
            Frequency::ThreeDay => TimeDelta::days(3),
        }
    }
}

/// A slot entry as read from the datastore.
///
/// Timestamp fields hold the raw stored text. A present but non-string value
/// is kept as its JSON text so it fails to parse like any other malformed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub id: String,
    pub enabled: bool,
    pub slot_start: Option<String>,
    pub slot_end: Option<String>,
    pub frequency: Frequency,
    pub last_update: Option<String>,
}

impl Slot {
    /// Returns `None` when the entry is not a JSON object.
    pub fn from_entry(id: &str, entry: &Value) -> Option<Self> {
        let fields = entry.as_object()?;
        Some(Self {
            id: id.to_string(),
            enabled: fields.get(ENABLED_FIELD).is_some_and(is_truthy),
            slot_start: fields.get(SLOT_START_FIELD).map(raw_text),
            slot_end: fields.get(SLOT_END_FIELD).map(raw_text),
            frequency: Frequency::from_value(fields.get(FREQUENCY_FIELD)),
            last_update: fields.get(LAST_UPDATE_FIELD).map(raw_text),
        })
    }

    /// Time of the last shift, or `now` when it was never recorded or is unreadable.
    pub fn last_update_at(&self, tz: Tz, now: &DateTime<Tz>) -> DateTime<Tz> {
        self.last_update
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| parse_local(tz, s).ok())
            .unwrap_or(*now)
    }

    /// Time elapsed since the last shift; zero when the last shift is unknown.
    pub fn elapsed_since_update(&self, tz: Tz, now: &DateTime<Tz>) -> TimeDelta {
        *now - self.last_update_at(tz, now)
    }

    /// Start and end of the current window with fallbacks applied.
    ///
    /// A missing boundary becomes [`SENTINEL_TIMESTAMP`]. A malformed start
    /// becomes today at 09:00; a malformed end becomes start + 1 day.
    pub fn window(&self, tz: Tz, now: &DateTime<Tz>) -> (DateTime<Tz>, DateTime<Tz>) {
        let start = match parse_local(tz, self.slot_start.as_deref().unwrap_or(SENTINEL_TIMESTAMP)) {
            Ok(start) => start,
            Err(_) => today_at(now, FALLBACK_START_HOUR),
        };
        let end = match parse_local(tz, self.slot_end.as_deref().unwrap_or(SENTINEL_TIMESTAMP)) {
            Ok(end) => end,
            Err(_) => shift_local(&start, TimeDelta::days(1)),
        };
        (start, end)
    }

    /// End of the window for lock checks. `None` when the stored end is
    /// malformed; a missing end reads as the sentinel.
    pub fn lock_deadline(&self, tz: Tz) -> Option<DateTime<Tz>> {
        parse_local(tz, self.slot_end.as_deref().unwrap_or(SENTINEL_TIMESTAMP)).ok()
    }
}

/// Loose truthiness of a stored JSON value: `null`, `false`, `0`, `""`,
/// `[]` and `{}` are false, everything else true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// A read that returned nothing usable.
pub fn is_empty_document(value: &Value) -> bool {
    !is_truthy(value)
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::format_local;
    use chrono_tz::Asia::Kolkata;
    use serde_json::json;

    fn now() -> DateTime<Tz> {
        parse_local(Kolkata, "2024-06-15 14:20:00").unwrap()
    }

    #[test]
    fn frequency_mapping() {
        assert_eq!(Frequency::parse("3day"), Frequency::ThreeDay);
        assert_eq!(Frequency::parse("3DAY"), Frequency::ThreeDay);
        assert_eq!(Frequency::parse("daily"), Frequency::Daily);
        assert_eq!(Frequency::parse("weekly"), Frequency::Daily);
        assert_eq!(Frequency::from_value(None), Frequency::Daily);
        assert_eq!(Frequency::from_value(Some(&json!(3))), Frequency::Daily);
        assert_eq!(Frequency::ThreeDay.period(), TimeDelta::days(3));
        assert_eq!(Frequency::Daily.period(), TimeDelta::days(1));
    }

    #[test]
    fn non_object_entry_is_not_a_slot() {
        assert!(Slot::from_entry("A", &json!("legacy")).is_none());
        assert!(Slot::from_entry("A", &json!(null)).is_none());
    }

    #[test]
    fn enabled_uses_truthiness() {
        let slot = |enabled: Value| Slot::from_entry("A", &json!({ "enabled": enabled })).unwrap();
        assert!(slot(json!(true)).enabled);
        assert!(slot(json!(1)).enabled);
        assert!(slot(json!("yes")).enabled);
        assert!(!slot(json!(false)).enabled);
        assert!(!slot(json!(0)).enabled);
        assert!(!slot(json!("")).enabled);
        assert!(!Slot::from_entry("A", &json!({})).unwrap().enabled);
    }

    #[test]
    fn unknown_last_update_means_no_time_elapsed() {
        for raw in [json!({}), json!({ "last_update": "" }), json!({ "last_update": "yesterday" })] {
            let slot = Slot::from_entry("A", &raw).unwrap();
            assert_eq!(slot.elapsed_since_update(Kolkata, &now()), TimeDelta::zero());
        }
    }

    #[test]
    fn window_fallbacks() {
        let missing = Slot::from_entry("A", &json!({})).unwrap();
        let (start, end) = missing.window(Kolkata, &now());
        assert_eq!(format_local(&start), SENTINEL_TIMESTAMP);
        assert_eq!(format_local(&end), SENTINEL_TIMESTAMP);

        let malformed = Slot::from_entry(
            "A",
            &json!({ "slot_start": "garbage", "slot_end": 12345 }),
        )
        .unwrap();
        let (start, end) = malformed.window(Kolkata, &now());
        assert_eq!(format_local(&start), "2024-06-15 09:00:00");
        assert_eq!(format_local(&end), "2024-06-16 09:00:00");
    }

    #[test]
    fn lock_deadline_skips_malformed_end() {
        let malformed = Slot::from_entry("A", &json!({ "slot_end": "soon" })).unwrap();
        assert!(malformed.lock_deadline(Kolkata).is_none());

        let missing = Slot::from_entry("A", &json!({})).unwrap();
        let deadline = missing.lock_deadline(Kolkata).unwrap();
        assert_eq!(format_local(&deadline), SENTINEL_TIMESTAMP);
    }

    #[test]
    fn empty_documents() {
        for empty in [json!(null), json!({}), json!([]), json!(""), json!(0), json!(false)] {
            assert!(is_empty_document(&empty), "{empty} should be empty");
        }
        assert!(!is_empty_document(&json!({ "slots": {} })));
    }
}
