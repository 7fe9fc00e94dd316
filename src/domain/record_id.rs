use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Opaque row identifier. The store hands back numeric ids for projects and
/// text ids elsewhere; both are accepted wherever an id is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(number) => RecordId::Number(number),
            Err(_) => RecordId::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            RecordId::Number(number) => Some(*number),
            RecordId::Text(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Number(number) => Value::from(*number),
            RecordId::Text(text) => Value::from(text.as_str()),
        }
    }
}

/// Id column that tolerates malformed values: anything other than an
/// integer or a string reads as missing.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(number)) => number.as_i64().map(RecordId::Number),
        Some(Value::String(text)) => Some(RecordId::Text(text)),
        _ => None,
    })
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(number) => write!(f, "{number}"),
            RecordId::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{lenient, RecordId};
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn parse_prefers_numbers_and_trims() {
        assert_eq!(RecordId::parse(" 42 "), RecordId::Number(42));
        assert_eq!(
            RecordId::parse("0190a1b2-task"),
            RecordId::Text("0190a1b2-task".to_string())
        );
    }

    #[test]
    fn decodes_numbers_and_strings() {
        let numeric: RecordId = serde_json::from_value(json!(7)).expect("number id");
        let text: RecordId = serde_json::from_value(json!("abc")).expect("text id");
        assert_eq!(numeric.as_number(), Some(7));
        assert_eq!(text.to_string(), "abc");
        assert_eq!(text.as_number(), None);
    }

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient")]
        id: Option<RecordId>,
    }

    #[test]
    fn lenient_ids_drop_malformed_values() {
        let row: Row = serde_json::from_value(json!({"id": {"nested": 1}})).expect("object id");
        assert_eq!(row.id, None);
        let row: Row = serde_json::from_value(json!({"id": 2.5})).expect("float id");
        assert_eq!(row.id, None);
        let row: Row = serde_json::from_value(json!({"id": "t9"})).expect("text id");
        assert_eq!(row.id, Some(RecordId::from("t9")));
    }
}
