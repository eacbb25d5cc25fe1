//! Date field handler.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde_json::Value;

use super::HandlerError;
use solr_indexer_shared::AttributeValue;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Format a UTC timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_utc(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn format_naive(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
}

/// Normalise a date-like value to a UTC ISO-8601 string with milliseconds.
///
/// Strings already ending in `Z` are passed through untouched. Zoned
/// timestamps keep their milliseconds; calendar timestamps are truncated to
/// whole seconds; plain dates get a zero time of day.
pub fn date_handler(value: AttributeValue) -> Result<Value, HandlerError> {
    let formatted = match value {
        AttributeValue::Null => return Err(HandlerError::MissingValue),
        AttributeValue::Text(text) => format_text(text)?,
        AttributeValue::Bytes(bytes) => {
            format_text(AttributeValue::Bytes(bytes).as_text())?
        }
        AttributeValue::Timestamp(timestamp) => format_utc(&timestamp.with_timezone(&Utc)),
        AttributeValue::CalendarDateTime { local, offset } => {
            let utc = match offset {
                Some(offset) => local
                    .checked_sub_signed(TimeDelta::seconds(offset.local_minus_utc() as i64))
                    .ok_or_else(|| HandlerError::malformed(format!("{} out of range", local)))?,
                None => local,
            };
            format_naive(&utc)
        }
        AttributeValue::Date(date) => format_date(&date),
        other => {
            return Err(HandlerError::malformed(format!(
                "cannot convert {:?} to a date",
                other
            )))
        }
    };
    Ok(Value::String(formatted))
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%dT00:00:00.000Z").to_string()
}

fn format_text(text: String) -> Result<String, HandlerError> {
    if text.ends_with('Z') {
        return Ok(text);
    }
    let trimmed = text.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(format_utc(&timestamp.with_timezone(&Utc)));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(format_utc(&timestamp.and_utc()));
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(format_date(&date));
        }
    }
    Err(HandlerError::malformed(format!("unparseable date {:?}", text)))
}
