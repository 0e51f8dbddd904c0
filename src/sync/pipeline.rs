//! Mutation pipeline: decode an envelope, dispatch it to a repository, then
//! notify subscribers once the write has committed.

use tracing::{info, warn};

use crate::repos::{ChangeEvent, CollectionRepo, EntityStore, SettingsRepo, TagRepo};
use crate::types::errors::MutationError;
use crate::types::mutation::{Mutation, MutationEnvelope};

#[derive(Clone)]
pub struct MutationPipeline {
    store: EntityStore,
}

impl MutationPipeline {
    pub fn new(store: EntityStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Applies a single mutation. Any error leaves the store untouched.
    pub fn apply(&self, envelope: &MutationEnvelope) -> Result<(), MutationError> {
        let mutation = Mutation::decode(envelope)?;
        match mutation {
            Mutation::UpdateCollection { id, fields } => {
                {
                    let guard = self.store.lock()?;
                    CollectionRepo::new(guard.connection()).update(&id, &fields)?;
                }
                self.store.notify(ChangeEvent::Collections);
                Ok(())
            }
            Mutation::UpdateTag { id, fields } => {
                {
                    let guard = self.store.lock()?;
                    TagRepo::new(guard.connection()).update(&id, &fields)?;
                }
                self.store.notify(ChangeEvent::Tags);
                Ok(())
            }
            Mutation::UpdateSettings { fields } => {
                {
                    let guard = self.store.lock()?;
                    SettingsRepo::new(guard.connection()).update(&fields)?;
                }
                self.store.notify(ChangeEvent::Settings);
                Ok(())
            }
            Mutation::CreateSettings { settings } => {
                {
                    let guard = self.store.lock()?;
                    SettingsRepo::new(guard.connection()).create(&settings)?;
                }
                self.store.notify(ChangeEvent::Settings);
                Ok(())
            }
            Mutation::CreateCollection | Mutation::CreateTag => {
                // Entities arrive via bootstrap bulk inserts; a standalone
                // create carries nothing to persist yet.
                info!(collection = %envelope.collection, "create mutation acknowledged");
                Ok(())
            }
            Mutation::Delete { collection } => Err(MutationError::NotImplemented(format!(
                "delete {}",
                collection.as_str()
            ))),
        }
    }

    /// Applies a delta batch record by record. Failures are collected, never
    /// compensated: already-applied records stay applied, and since every
    /// mutation is idempotent a later retry of the whole batch is safe.
    pub fn apply_delta_changes(
        &self,
        envelopes: &[MutationEnvelope],
    ) -> Vec<(usize, MutationError)> {
        let mut failures = Vec::new();
        for (index, envelope) in envelopes.iter().enumerate() {
            if let Err(err) = self.apply(envelope) {
                warn!(
                    index,
                    collection = %envelope.collection,
                    operation = %envelope.operation,
                    error = %err,
                    "delta record failed to apply"
                );
                failures.push((index, err));
            }
        }
        failures
    }
}
