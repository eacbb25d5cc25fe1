//! Raw attribute values as read from content objects.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

/// A raw attribute value before it is normalised for the wire.
///
/// Content objects hand these to the extractor; field type handlers and
/// the extractor turn them into `serde_json::Value`s.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Byte string that is expected, but not guaranteed, to be UTF-8.
    Bytes(Vec<u8>),
    List(Vec<AttributeValue>),
    /// Zoned timestamp with sub-second precision.
    Timestamp(DateTime<FixedOffset>),
    /// Calendar timestamp, optionally carrying its UTC offset.
    CalendarDateTime {
        local: NaiveDateTime,
        offset: Option<FixedOffset>,
    },
    Date(NaiveDate),
}

impl AttributeValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Render the value as plain text, used when joining sequences and
    /// when emitting form literals.
    pub fn as_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Bytes(b) => decode_utf8_ignoring_invalid(b),
            Self::List(items) => join(items, " "),
            Self::Timestamp(dt) => dt.to_rfc3339(),
            Self::CalendarDateTime { local, offset } => match offset {
                Some(offset) => format!("{}{}", local.format("%Y-%m-%dT%H:%M:%S"), offset),
                None => local.format("%Y-%m-%dT%H:%M:%S").to_string(),
            },
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Join the elements of a sequence value with `separator`. Scalars are
    /// returned as their text form.
    pub fn join(&self, separator: &str) -> String {
        match self {
            Self::List(items) => join(items, separator),
            other => other.as_text(),
        }
    }

    /// Convert to a wire value without any field-type specific handling.
    /// Byte strings are decoded as UTF-8, dropping undecodable bytes.
    pub fn into_wire(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(b),
            Self::Int(i) => Value::Number(i.into()),
            Self::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            Self::Text(s) => Value::String(s),
            Self::Bytes(b) => Value::String(decode_utf8_ignoring_invalid(&b)),
            Self::List(items) => Value::Array(items.into_iter().map(Self::into_wire).collect()),
            other => Value::String(other.as_text()),
        }
    }
}

/// Join sequence elements with `separator`.
fn join(items: &[AttributeValue], separator: &str) -> String {
    items
        .iter()
        .map(AttributeValue::as_text)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Decode bytes as UTF-8, silently dropping invalid sequences.
fn decode_utf8_ignoring_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_utf8_is_dropped() {
        let value = AttributeValue::Bytes(b"caf\xc3\xa9 \xff\xfeok".to_vec());
        assert_eq!(value.into_wire(), Value::String("café ok".to_string()));
    }

    #[test]
    fn test_join_sequence() {
        let value = AttributeValue::from(vec!["a", "b", "c"]);
        assert_eq!(value.join(", "), "a, b, c");
        assert_eq!(AttributeValue::Int(3).join(","), "3");
    }

    #[test]
    fn test_list_into_wire_keeps_elements() {
        let value = AttributeValue::List(vec![AttributeValue::Int(1), AttributeValue::text("x")]);
        assert_eq!(value.into_wire(), serde_json::json!([1, "x"]));
    }
}
