//! Normalization of stored timestamp representations.
//!
//! Documents written by browser clients carry timestamps as wrapper objects
//! (`{"seconds": .., "nanoseconds": ..}`, or the `_seconds`/`_nanoseconds`
//! form produced by server SDKs) and dates picked from forms as bare
//! `YYYY-MM-DD` strings. Both are rewritten to RFC 3339 strings here so the
//! typed records only ever see one format.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Rewrites every timestamp wrapper in `value`, recursively, to RFC 3339.
pub fn normalize(value: &mut Value) {
    if let Some(timestamp) = value.as_object().and_then(wrapper_timestamp) {
        *value = Value::String(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true));
        return;
    }

    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if is_date_key(key)
                    && let Some(timestamp) = field.as_str().and_then(date_only)
                {
                    *field = Value::String(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true));
                } else {
                    normalize(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize),
        _ => {}
    }
}

fn wrapper_timestamp(map: &Map<String, Value>) -> Option<DateTime<Utc>> {
    let seconds = map.get("seconds").or_else(|| map.get("_seconds"))?.as_i64()?;
    let nanos_field = map.get("nanoseconds").or_else(|| map.get("_nanoseconds"));
    let nanos = match nanos_field {
        Some(nanos) => u32::try_from(nanos.as_u64()?).ok()?,
        None => 0,
    };

    // A wrapper carries nothing besides the timestamp fields.
    if map.len() != 1 + usize::from(nanos_field.is_some()) {
        return None;
    }

    DateTime::from_timestamp(seconds, nanos)
}

fn is_date_key(key: &str) -> bool {
    key == "date" || key.ends_with("Date") || key.ends_with("At")
}

fn date_only(raw: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
