//! Lenient field decoders for documents written by other workflows.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Decodes `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawQuantity {
    fn whole(value: f64) -> Option<i64> {
        // i64::MAX as f64 rounds up, so the upper bound is exclusive.
        (value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64)
            .then_some(value as i64)
    }

    fn into_quantity(self) -> i64 {
        match self {
            RawQuantity::Integer(n) => n,
            RawQuantity::Float(f) => Self::whole(f).unwrap_or(0),
            RawQuantity::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(Self::whole))
                    .unwrap_or(0)
            }
            RawQuantity::Other(_) => 0,
        }
    }
}

/// Decodes a line quantity.
///
/// Integers, whole floats and numeric strings are accepted; anything else,
/// including fractional values, counts as 0.
pub(crate) fn lenient_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(RawQuantity::deserialize(deserializer)?.into_quantity())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientEntry<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

/// Decodes a list, dropping entries that do not have the element's shape.
///
/// A missing or `null` list is empty.
pub(crate) fn skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = Option::<Vec<LenientEntry<T>>>::deserialize(deserializer)?.unwrap_or_default();
    let total = entries.len();
    let valid: Vec<T> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            LenientEntry::Valid(value) => Some(value),
            LenientEntry::Invalid(_) => None,
        })
        .collect();

    if valid.len() < total {
        tracing::warn!(skipped = total - valid.len(), "skipping malformed list entries");
    }
    Ok(valid)
}
