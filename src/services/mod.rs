//! Supporting services: credential sealing and storage.

pub mod credential_store;
pub mod crypto;

pub use credential_store::{
    CredentialStore, MemoryCredentialStore, SqliteCredentialStore, SESSION_TOKEN_KEY,
};
pub use crypto::{SealedData, SessionCipher};
