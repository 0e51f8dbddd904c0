use serde::{Deserialize, Serialize};

use super::{de_loose_bool, de_tags};

/// A highlight attached to a bookmark. Tag fan-out mirrors bookmarks via the
/// `highlight_tags` join table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Highlight {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "bookmarkId")]
    pub bookmark_id: String,
    pub color: String,
    #[serde(rename = "isSticky", default, deserialize_with = "de_loose_bool")]
    pub is_sticky: bool,
    #[serde(rename = "isFavorite", default, deserialize_with = "de_loose_bool")]
    pub is_favorite: bool,
    #[serde(default, deserialize_with = "de_tags")]
    pub tags: Vec<String>,
}

/// Partial-field update for a highlight.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialHighlight {
    pub color: Option<String>,
    #[serde(rename = "isSticky", default, deserialize_with = "super::de_opt_loose_bool")]
    pub is_sticky: Option<bool>,
    #[serde(rename = "isFavorite", default, deserialize_with = "super::de_opt_loose_bool")]
    pub is_favorite: Option<bool>,
    pub tags: Option<Vec<String>>,
}
