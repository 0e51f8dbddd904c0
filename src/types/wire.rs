//! Wire shapes for the transport and live channels.

use serde::Deserialize;
use serde_json::Value;

use super::bookmark::Bookmark;
use super::collection::Collection;
use super::highlight::Highlight;
use super::settings::UserSettings;
use super::tag::Tag;

/// The remote user record returned at startup. Carries the authoritative
/// cursor and the settings document to persist locally.
#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub profile: UserProfile,
    pub settings: UserSettings,
    #[serde(rename = "syncId")]
    pub sync_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
}

/// Full snapshot of collections and tags fetched during bootstrap.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapSnapshot {
    pub collections: Vec<Collection>,
    pub tags: Vec<Tag>,
}

/// One record of a delta batch. `data` is a JSON-encoded string needing a
/// second decode pass.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncRecord {
    pub data: String,
    pub collection: String,
    pub operation: String,
    #[serde(rename = "arrayOperation", default)]
    pub array_operation: Option<String>,
    #[serde(rename = "syncId")]
    pub sync_id: i64,
    #[serde(rename = "_id", default)]
    pub revision_id: String,
}

/// A fetched delta: all records with revision in `(from, to]`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaBatch {
    pub count: i64,
    #[serde(rename = "syncRecords")]
    pub records: Vec<SyncRecord>,
}

/// One line of the newline-delimited backlog stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum BacklogRecord {
    Bookmarks(Bookmark),
    Highlights(Highlight),
}

/// A decoded inbound live message, already demuxed by the wire client.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveMessage {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(rename = "clientId", default)]
    pub client_id: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub data: Value,
    /// Informational only at this layer; never advances the cursor.
    #[serde(rename = "syncId", default)]
    pub sync_id: Option<String>,
}

/// Outcome of the login verification step.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    #[serde(rename = "verificationToken", default)]
    pub verification_token: Option<String>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}
