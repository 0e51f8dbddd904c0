use serde::{Deserialize, Serialize};

use super::de_loose_bool;

/// A tag. Mirrors the collection hierarchy shape but has no enforced root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "parent", default)]
    pub parent_id: String,
    #[serde(rename = "userId", default)]
    pub owner_id: String,
    #[serde(rename = "isFavorite", default, deserialize_with = "de_loose_bool")]
    pub is_favorite: bool,
}

/// Partial-field update for a tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialTag {
    pub name: Option<String>,
    #[serde(rename = "parent")]
    pub parent_id: Option<String>,
    #[serde(rename = "userId")]
    pub owner_id: Option<String>,
    #[serde(rename = "isFavorite", default, deserialize_with = "super::de_opt_loose_bool")]
    pub is_favorite: Option<bool>,
}
