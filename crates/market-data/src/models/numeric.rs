//! Serde helpers that accept numbers encoded either as JSON numbers or as
//! strings. Coinranking sends `"price": "2317.32"`, PostgREST sends `numeric`
//! columns as strings too, while hand-written fixtures use plain numbers.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn parse_finite<E: de::Error>(raw: NumberOrString) -> Result<f64, E> {
    let value = match raw {
        NumberOrString::Number(n) => n,
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| E::custom(format!("not a number: {:?}", s)))?,
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(E::custom(format!("non-finite number: {}", value)))
    }
}

/// Deserializes an `f64` from a number or numeric string.
pub fn f64_from_any<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    parse_finite(NumberOrString::deserialize(deserializer)?)
}

/// Deserializes a non-negative integer rank from a number or numeric string.
pub fn u32_from_any<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value: f64 = parse_finite(NumberOrString::deserialize(deserializer)?)?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(de::Error::custom(format!("not a valid rank: {}", value)));
    }
    Ok(value as u32)
}
