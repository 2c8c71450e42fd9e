//! Lenient field decoding for webhook payloads
//!
//! Senders are inconsistent about quoting numbers, so scalar message fields
//! accept either a JSON string or a JSON number.

use serde::{de, Deserialize, Deserializer};

/// A scalar that arrived as either a number or a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    /// Integer value
    Int(i64),
    /// Non-integer number
    Float(f64),
    /// Text value
    Text(String),
}

/// Decode an integer from a number or a numeric string
///
/// Fractional numbers are rejected rather than truncated.
pub fn int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Int(value) => Ok(value),
        Scalar::Float(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            Ok(value as i64)
        }
        Scalar::Float(value) => Err(de::Error::custom(format!(
            "expected an integer, got {}",
            value
        ))),
        Scalar::Text(text) => text.trim().parse::<i64>().map_err(|_| {
            de::Error::custom(format!("expected an integer, got \"{}\"", text))
        }),
    }
}

/// Decode an optional string, rendering numbers as text
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Int(value) => value.to_string(),
        Scalar::Float(value) => value.to_string(),
        Scalar::Text(text) => text,
    }))
}
