// linkvault shared type definitions
// Each submodule defines one entity family or wire shape used across the crate.

pub mod bookmark;
pub mod collection;
pub mod errors;
pub mod highlight;
pub mod mutation;
pub mod settings;
pub mod tag;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// A timestamp value as it arrives in a partial update: either an already
/// typed instant or a raw string that still needs ISO-8601 parsing.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimestampValue {
    Instant(DateTime<Utc>),
    Text(String),
}

impl TimestampValue {
    /// Returns the instant, parsing ISO-8601 text if needed. `None` when the
    /// text is unparsable; callers log and skip the field.
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            TimestampValue::Instant(t) => Some(*t),
            TimestampValue::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
        }
    }
}

/// Tolerant `updatedAt` decoding: missing, non-string, or unparsable values
/// all become `None` rather than failing the whole record.
pub(crate) fn de_opt_datetime<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(d)?;
    Ok(raw.and_then(|v| match v {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        _ => None,
    }))
}

/// Tags arrive either as a JSON array or as the comma-joined string the
/// denormalized column stores.
pub(crate) fn de_tags<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagsRepr {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<TagsRepr>::deserialize(d)? {
        Some(TagsRepr::List(v)) => v,
        Some(TagsRepr::Joined(s)) if s.is_empty() => Vec::new(),
        Some(TagsRepr::Joined(s)) => s.split(',').map(str::to_string).collect(),
        None => Vec::new(),
    })
}

/// Booleans arrive either typed or as 0/1 integers.
pub(crate) fn de_opt_loose_bool<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolRepr {
        Flag(bool),
        Int(i64),
    }

    Ok(Option::<BoolRepr>::deserialize(d)?.map(|v| match v {
        BoolRepr::Flag(b) => b,
        BoolRepr::Int(n) => n != 0,
    }))
}

/// Missing or malformed booleans default to `false` on full records.
pub(crate) fn de_loose_bool<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    de_opt_loose_bool(d).map(|v| v.unwrap_or(false))
}
