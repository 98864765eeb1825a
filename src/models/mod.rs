use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const UNTITLED: &str = "Untitled";

/// A single note as held by either the remote service or the local store.
///
/// Decoding is lenient: any JSON object is a note. Numeric ids are turned
/// into strings, and a missing or null field becomes an empty string.
/// Timestamps are accepted under both `createdAt`/`updatedAt` and
/// `created_at`/`updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default, deserialize_with = "id_to_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub content: String,
    #[serde(default, alias = "created_at", deserialize_with = "null_to_default")]
    pub created_at: String,
    #[serde(default, alias = "updated_at", deserialize_with = "null_to_default")]
    pub updated_at: String,
}

impl Note {
    /// Fails for anything but an object, and for an object that names the
    /// same field twice (`updatedAt` next to `updated_at`).
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if !value.is_object() {
            return Err(serde::de::Error::custom("expected a note object"));
        }
        serde_json::from_value(value)
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }
}

fn id_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn null_to_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

/// Sorts by `updated_at` descending, comparing the timestamps as plain
/// strings. Stable, so notes with equal timestamps keep their order.
pub fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current UTC time, moved one millisecond past `floor` when the clock has
/// not advanced beyond it.
pub fn timestamp_after(floor: Option<&str>) -> String {
    let now = Utc::now();
    let floor = floor
        .and_then(|f| DateTime::parse_from_rfc3339(f).ok())
        .map(|f| f.with_timezone(&Utc));

    match floor {
        Some(floor) if now <= floor => format_timestamp(floor + Duration::milliseconds(1)),
        _ => format_timestamp(now),
    }
}
