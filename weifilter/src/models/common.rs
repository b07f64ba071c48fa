use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// JavaScript-style truthiness, used for `next_cursor`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The `ok` flag comes as `1`/`0` on most endpoints and as a bool on some.
/// Negative codes such as `-100` (session expired) are failures.
pub fn deserialize_ok<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    })
}
