//! Typed mutation model.
//!
//! The wire carries a generic `{operation, collection, arrayOperation?, data}`
//! envelope. It is decoded exactly once, at the pipeline boundary, into the
//! closed [`Mutation`] enum; everything downstream works with typed variants.

use serde::Deserialize;
use serde_json::Value;

use super::collection::PartialCollection;
use super::errors::MutationError;
use super::settings::{PartialUserSettings, UserSettings};
use super::tag::PartialTag;

/// The raw mutation envelope as received from delta records, live messages,
/// or local callers.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationEnvelope {
    pub operation: String,
    pub collection: String,
    #[serde(rename = "arrayOperation", default)]
    pub array_operation: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl MutationEnvelope {
    pub fn new(operation: &str, collection: &str, data: Value) -> Self {
        Self {
            operation: operation.to_string(),
            collection: collection.to_string(),
            array_operation: None,
            data,
        }
    }
}

/// The collections the pipeline dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCollection {
    Collections,
    Tags,
    Settings,
}

impl EntityCollection {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "collections" => Some(EntityCollection::Collections),
            "tags" => Some(EntityCollection::Tags),
            "settings" => Some(EntityCollection::Settings),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCollection::Collections => "collections",
            EntityCollection::Tags => "tags",
            EntityCollection::Settings => "settings",
        }
    }
}

/// A fully decoded mutation, ready for repository dispatch.
#[derive(Debug, Clone)]
pub enum Mutation {
    UpdateCollection { id: String, fields: PartialCollection },
    UpdateTag { id: String, fields: PartialTag },
    UpdateSettings { fields: PartialUserSettings },
    CreateSettings { settings: UserSettings },
    /// Bootstrap bulk-insert is the only creation path for collections;
    /// acknowledged but not persisted.
    CreateCollection,
    /// Acknowledged but not persisted, like `CreateCollection`.
    CreateTag,
    /// Always answered with `NotImplemented`.
    Delete { collection: EntityCollection },
}

impl Mutation {
    /// Decodes an envelope into a typed mutation. Target id resolution: the
    /// settings singleton is always `"1"`; everything else needs `data._id`.
    pub fn decode(envelope: &MutationEnvelope) -> Result<Mutation, MutationError> {
        let collection = EntityCollection::parse(&envelope.collection)
            .ok_or_else(|| MutationError::UnknownCollection(envelope.collection.clone()))?;

        match envelope.operation.as_str() {
            "update" => match collection {
                EntityCollection::Settings => {
                    let fields: PartialUserSettings =
                        serde_json::from_value(envelope.data.clone())
                            .map_err(|e| MutationError::Decode(e.to_string()))?;
                    Ok(Mutation::UpdateSettings { fields })
                }
                EntityCollection::Collections => {
                    let id = Self::target_id(&envelope.data)?;
                    let fields: PartialCollection =
                        serde_json::from_value(envelope.data.clone())
                            .map_err(|e| MutationError::Decode(e.to_string()))?;
                    Ok(Mutation::UpdateCollection { id, fields })
                }
                EntityCollection::Tags => {
                    let id = Self::target_id(&envelope.data)?;
                    let fields: PartialTag = serde_json::from_value(envelope.data.clone())
                        .map_err(|e| MutationError::Decode(e.to_string()))?;
                    Ok(Mutation::UpdateTag { id, fields })
                }
            },
            "create" => match collection {
                EntityCollection::Settings => {
                    let settings_value = envelope
                        .data
                        .get("settings")
                        .filter(|v| v.is_object())
                        .ok_or(MutationError::MissingSettings)?;
                    let settings: UserSettings =
                        serde_json::from_value(settings_value.clone())
                            .map_err(|e| MutationError::Decode(e.to_string()))?;
                    Ok(Mutation::CreateSettings { settings })
                }
                EntityCollection::Collections => Ok(Mutation::CreateCollection),
                EntityCollection::Tags => Ok(Mutation::CreateTag),
            },
            "delete" => Ok(Mutation::Delete { collection }),
            other => Err(MutationError::UnknownOperation(other.to_string())),
        }
    }

    fn target_id(data: &Value) -> Result<String, MutationError> {
        data.get("_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(MutationError::MissingIdentifier)
    }
}
