//! Permissive deserializers for heartbeat fields.
//!
//! Tokens are produced by more than one backend, and policy fields arrive
//! as numbers, numeric strings, or not at all. Anything that cannot be
//! read is treated as unset instead of failing the whole token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a non-negative integer from a number or numeric string.
pub fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_count))
}

/// Read an RFC 3339 instant; unparseable values become `None`.
pub fn instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    })
}

fn value_as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_counts() {
        assert_eq!(value_as_count(&json!(30)), Some(30));
        assert_eq!(value_as_count(&json!("30")), Some(30));
        assert_eq!(value_as_count(&json!(" 7 ")), Some(7));
        assert_eq!(value_as_count(&json!(2.9)), Some(2));
        assert_eq!(value_as_count(&json!(-1)), None);
        assert_eq!(value_as_count(&json!("abc")), None);
        assert_eq!(value_as_count(&json!(true)), None);
    }
}
