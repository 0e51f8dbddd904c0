use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_loose_bool, de_opt_datetime, TimestampValue};

/// Id of the synthetic root collection. The root is its own parent and the
/// implicit ancestor of every top-level collection.
pub const ROOT_COLLECTION_ID: &str = "0";

/// A collection (folder) in the self-referential hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "parent")]
    pub parent_id: String,
    #[serde(rename = "isFavorite", default, deserialize_with = "de_loose_bool")]
    pub is_favorite: bool,
    #[serde(rename = "updatedAt", default, deserialize_with = "de_opt_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "userId", default)]
    pub owner_id: String,
}

impl Collection {
    /// The synthetic root inserted before any bulk insert runs.
    pub fn root() -> Self {
        Self {
            id: ROOT_COLLECTION_ID.to_string(),
            name: "Root Collection".to_string(),
            parent_id: ROOT_COLLECTION_ID.to_string(),
            is_favorite: false,
            updated_at: None,
            owner_id: "system".to_string(),
        }
    }
}

/// Partial-field update for a collection. Unknown wire keys are ignored by
/// construction; absent fields leave the row untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialCollection {
    pub name: Option<String>,
    #[serde(rename = "parent")]
    pub parent_id: Option<String>,
    #[serde(rename = "isFavorite", default, deserialize_with = "super::de_opt_loose_bool")]
    pub is_favorite: Option<bool>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<TimestampValue>,
    #[serde(rename = "userId")]
    pub owner_id: Option<String>,
}
