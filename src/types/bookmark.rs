use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_loose_bool, de_opt_datetime, de_tags};
use crate::types::collection::ROOT_COLLECTION_ID;

fn default_parent() -> String {
    ROOT_COLLECTION_ID.to_string()
}

/// A saved bookmark. Tags are carried both denormalized here and as rows in
/// the `bookmark_tags` join table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub domain: String,
    #[serde(rename = "parent", default = "default_parent")]
    pub parent_id: String,
    #[serde(rename = "isFavorite", default, deserialize_with = "de_loose_bool")]
    pub is_favorite: bool,
    #[serde(rename = "updatedAt", default, deserialize_with = "de_opt_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_tags")]
    pub tags: Vec<String>,
}

/// Partial-field update for a bookmark.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialBookmark {
    pub title: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
    #[serde(rename = "parent")]
    pub parent_id: Option<String>,
    #[serde(rename = "isFavorite", default, deserialize_with = "super::de_opt_loose_bool")]
    pub is_favorite: Option<bool>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<super::TimestampValue>,
    pub tags: Option<Vec<String>>,
}
