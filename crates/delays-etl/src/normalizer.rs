//! Raw record → canonical delay record
//!
//! Normalization never fails. Each field has its own coercion with an explicit
//! fallback, and every rule reads the raw input rather than the output of an
//! earlier rule:
//!
//! | field | fallback |
//! |---|---|
//! | `record_id` | `"unknown"` |
//! | `timestamp` | null when any component is unusable or out of range |
//! | `dwell_time` | 0 |
//! | `month` / `day` names | 1 when the name is not in the table |

use chrono::{NaiveDate, NaiveDateTime};
use delays_common::{legacy_record_id, RawRecord, LEGACY_ID_FIELD};
use serde_json::Value;
use tracing::debug;

use crate::models::DelayRecord;

/// Month names in calendar order, matched case-sensitively
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday names, Monday first, matched case-sensitively
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Ordinal used for month and day names missing from the tables
pub const UNRECOGNIZED_NAME_ORDINAL: i32 = 1;

pub const DEFAULT_TIMESTAMP_YEAR: i64 = 2025;
pub const DEFAULT_TIMESTAMP_MONTH: i64 = 1;
pub const DEFAULT_TIMESTAMP_DAY: i64 = 1;
pub const DEFAULT_TIMESTAMP_HOUR: i64 = 0;

// Keys that become typed columns; everything else lands in `extra`.
const COLUMN_KEYS: [&str; 12] = [
    LEGACY_ID_FIELD,
    "timestamp",
    "flight_id",
    "location",
    "location_hour",
    "location_part_of_day",
    "delay_category",
    "dwell_time",
    "incident",
    "year",
    "month",
    "day",
];

/// Normalize a raw record into the canonical shape
pub fn normalize(mut raw: RawRecord) -> DelayRecord {
    // A present `is_incident` always wins; a bare `incident` column only
    // counts when it is not null.
    let incident_flag = match raw.get("is_incident") {
        Some(flag) => Some(incident(flag)),
        None => raw.get("incident").filter(|v| !v.is_null()).map(incident),
    };

    let mut record = DelayRecord {
        record_id: legacy_record_id(&raw),
        timestamp: timestamp(&raw),
        flight_id: raw.get("flight_id").and_then(text),
        location: location(raw.get("location")),
        location_hour: raw.get("location_hour").and_then(integral_i32),
        location_part_of_day: raw.get("location_part_of_day").and_then(text),
        delay_category: raw.get("delay_category").and_then(text),
        dwell_time: dwell_time(raw.get("dwell_time")),
        incident: incident_flag,
        year: raw.get("year").and_then(integral_i32),
        month: month(raw.get("month")),
        day: day(raw.get("day")),
        extra: Default::default(),
    };

    for key in COLUMN_KEYS {
        raw.remove(key);
    }
    record.extra = raw;

    record
}

/// Build the event timestamp from its calendar components.
///
/// Missing components take their defaults; a component that is present but
/// unusable, or a combination that is not a real date-time, yields `None`.
pub fn timestamp(raw: &RawRecord) -> Option<NaiveDateTime> {
    let year = component(raw.get("year"), DEFAULT_TIMESTAMP_YEAR, &[])?;
    let month = component(raw.get("month"), DEFAULT_TIMESTAMP_MONTH, &MONTH_NAMES)?;
    let day = component(raw.get("day"), DEFAULT_TIMESTAMP_DAY, &WEEKDAY_NAMES)?;
    let hour = component(raw.get("location_hour"), DEFAULT_TIMESTAMP_HOUR, &[])?;

    let built = build_timestamp(year, month, day, hour);
    if built.is_none() {
        debug!(year, month, day, hour, "Timestamp components out of range");
    }
    built
}

fn build_timestamp(year: i64, month: i64, day: i64, hour: i64) -> Option<NaiveDateTime> {
    // Same calendar bounds as the source system's date type.
    if !(1..=9999).contains(&year) {
        return None;
    }

    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?
    .and_hms_opt(u32::try_from(hour).ok()?, 0, 0)
}

fn component(value: Option<&Value>, default: i64, names: &[&str]) -> Option<i64> {
    let Some(value) = value else {
        return Some(default);
    };

    truncating_int(value).or_else(|| {
        value
            .as_str()
            .and_then(|name| ordinal(names, name))
            .map(i64::from)
    })
}

/// Dwell time in whole minutes.
///
/// Parses numbers and numeric strings as floats and rounds half to even.
/// Missing, unparsable, non-finite, negative, or out-of-range values give 0.
pub fn dwell_time(value: Option<&Value>) -> i32 {
    let parsed = match value {
        None => Some(0.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::Null | Value::Array(_) | Value::Object(_)) => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .map(f64::round_ties_even)
        .filter(|v| (0.0..=f64::from(i32::MAX)).contains(v))
        .map(|v| v as i32)
        .unwrap_or(0)
}

/// Location code, trimmed and upper-cased
pub fn location(value: Option<&Value>) -> Option<String> {
    value
        .and_then(text)
        .map(|s| s.trim().to_uppercase())
}

/// Incident flag: JSON truthiness of the legacy `is_incident` value.
///
/// `null`, `false`, zero, and empty strings, arrays or objects are false;
/// everything else is true.
pub fn incident(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Month ordinal: names via [`MONTH_NAMES`], numbers unchanged
pub fn month(value: Option<&Value>) -> Option<i32> {
    named_ordinal(value, &MONTH_NAMES)
}

/// Day ordinal: weekday names via [`WEEKDAY_NAMES`], numbers unchanged
pub fn day(value: Option<&Value>) -> Option<i32> {
    named_ordinal(value, &WEEKDAY_NAMES)
}

fn named_ordinal(value: Option<&Value>, names: &[&str]) -> Option<i32> {
    match value? {
        Value::String(name) => Some(ordinal(names, name).unwrap_or(UNRECOGNIZED_NAME_ORDINAL)),
        other => integral_i32(other),
    }
}

fn ordinal(names: &[&str], name: &str) -> Option<i32> {
    names
        .iter()
        .position(|candidate| *candidate == name)
        .and_then(|idx| i32::try_from(idx + 1).ok())
}

/// Scalar as text; structured values and null have no text form
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Integer that may come as a float (truncated toward zero) or a numeric string
fn truncating_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite() && v.abs() < 9.0e18)
                .map(|v| v.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer column value: whole numbers only, including `9.0` and `"9"`
fn integral_i32(value: &Value) -> Option<i32> {
    let whole = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| v.fract() == 0.0 && v.abs() < 9.0e18)
                .map(|v| v as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;

    i32::try_from(whole).ok()
}
