//! Remote transport boundary. The coordinator talks to this trait only, so
//! tests can swap in a scripted transport without any HTTP.

pub mod client;

pub use client::HttpTransport;

use crate::types::errors::TransportError;
use crate::types::mutation::MutationEnvelope;
use crate::types::wire::{BootstrapSnapshot, DeltaBatch, UserData};

pub trait Transport {
    /// Fetches the authenticated user, their settings, and the server cursor.
    fn fetch_user(&self) -> Result<UserData, TransportError>;

    /// Full snapshot of collections and tags for bootstrap.
    fn fetch_bootstrap_snapshot(&self) -> Result<BootstrapSnapshot, TransportError>;

    /// Raw newline-delimited backlog of bookmarks and highlights.
    fn fetch_backlog(&self) -> Result<String, TransportError>;

    /// All change records with revision in `(from, to]`.
    fn fetch_delta(&self, from: i64, to: i64) -> Result<DeltaBatch, TransportError>;

    /// Pushes a locally applied mutation, stamped with this client's id.
    fn push_mutation(
        &self,
        envelope: &MutationEnvelope,
        client_id: &str,
    ) -> Result<(), TransportError>;

    /// Starts an email login; returns the verification token to present.
    fn initiate_login(&self, email: &str) -> Result<String, TransportError>;

    /// Completes the login and returns the session token to persist.
    fn verify_login(&self, email: &str, token: &str) -> Result<String, TransportError>;
}
