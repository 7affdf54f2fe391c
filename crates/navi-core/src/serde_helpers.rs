//! Serde helpers for amounts that arrive as JSON strings or numbers

use serde::{de, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Unsigned(u64),
    Float(f64),
}

fn to_u64<E: de::Error>(value: StringOrNumber) -> Result<u64, E> {
    match value {
        StringOrNumber::Unsigned(n) => Ok(n),
        StringOrNumber::String(s) => s
            .trim()
            .parse::<u64>()
            .or_else(|_| {
                // Quote services occasionally send "123.0"
                s.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.floor() as u64)
                    .ok_or(())
            })
            .map_err(|_| E::custom(format!("invalid amount: {}", s))),
        StringOrNumber::Float(f) if f.is_finite() && f >= 0.0 => Ok(f.floor() as u64),
        StringOrNumber::Float(f) => Err(E::custom(format!("invalid amount: {}", f))),
    }
}

/// Deserialize a `u64` from `"123"`, `123` or `123.0` (floored)
pub fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    to_u64(StringOrNumber::deserialize(deserializer)?)
}

/// Optional variant of [`u64_from_str_or_num`]
pub fn opt_u64_from_str_or_num<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer)?
        .map(to_u64)
        .transpose()
}

/// Serialize a `u64` as a decimal string (Sui JSON-RPC convention)
pub fn u64_as_string<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}
