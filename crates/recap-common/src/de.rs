//! Lenient serde helpers for upstream payloads.
//!
//! Tautulli and Plex report the same field as a number on one endpoint and a
//! string on another, and use `""` for unknown values. These helpers accept
//! either shape and map blanks and unparseable values to `None`.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

/// Deserialize an optional string that may arrive as a number.
pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.and_then(|value| match value {
            StringOrNumber::Str(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            StringOrNumber::Int(i) => Some(i.to_string()),
            StringOrNumber::Float(f) => Some(f.to_string()),
        }),
    )
}

/// Deserialize an optional integer that may arrive as a string.
pub fn optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.and_then(|value| match value {
            StringOrNumber::Str(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(float_to_i64))
            }
            StringOrNumber::Int(i) => Some(i),
            StringOrNumber::Float(f) => float_to_i64(f),
        }),
    )
}

/// Deserialize an optional float that may arrive as a string.
pub fn optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.and_then(|value| match value {
            StringOrNumber::Str(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            #[allow(clippy::cast_precision_loss)]
            StringOrNumber::Int(i) => Some(i as f64),
            StringOrNumber::Float(f) => Some(f).filter(|f| f.is_finite()),
        }),
    )
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_i64(value: f64) -> Option<i64> {
    (value.is_finite() && value.abs() < 9.0e18).then(|| value.trunc() as i64)
}
