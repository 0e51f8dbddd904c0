//! Credential persistence.
//!
//! The session token lives in the `credentials` table, sealed with
//! AES-256-GCM so a copied database file does not leak it. `load` returning
//! `None` covers both "never logged in" and "unreadable row"; callers treat
//! either as logged out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::params;
use tracing::warn;
use zeroize::Zeroize;

use crate::database::Database;
use crate::services::crypto::{SealedData, SessionCipher};
use crate::types::errors::CredentialError;

/// Row key for the server session token.
pub const SESSION_TOKEN_KEY: &str = "session_id";

pub trait CredentialStore {
    fn load(&self, key: &str) -> Option<Vec<u8>>;
    fn save(&self, key: &str, value: &[u8]) -> Result<(), CredentialError>;
    /// Returns whether a credential was actually removed.
    fn delete(&self, key: &str) -> bool;
}

pub struct SqliteCredentialStore {
    db: Arc<Mutex<Database>>,
    cipher: SessionCipher,
    sealing_key: Vec<u8>,
}

impl SqliteCredentialStore {
    pub fn new(db: Arc<Mutex<Database>>, sealing_key: Vec<u8>) -> Self {
        Self {
            db,
            cipher: SessionCipher::new(),
            sealing_key,
        }
    }

    /// Convenience constructor deriving the sealing key from a passphrase
    /// and a caller-persisted salt.
    pub fn with_passphrase(
        db: Arc<Mutex<Database>>,
        passphrase: &str,
        salt: &[u8],
    ) -> Result<Self, CredentialError> {
        let cipher = SessionCipher::new();
        let sealing_key = cipher
            .derive_key(passphrase, salt)
            .map_err(|e| CredentialError::Crypto(e.to_string()))?;
        Ok(Self {
            db,
            cipher,
            sealing_key,
        })
    }
}

impl Drop for SqliteCredentialStore {
    fn drop(&mut self) {
        self.sealing_key.zeroize();
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        let guard = self.db.lock().ok()?;
        let row = guard
            .connection()
            .query_row(
                "SELECT ciphertext, iv, auth_tag FROM credentials WHERE key = ?1",
                params![key],
                |row| {
                    Ok(SealedData {
                        ciphertext: row.get(0)?,
                        iv: row.get(1)?,
                        auth_tag: row.get(2)?,
                    })
                },
            )
            .ok()?;
        match self.cipher.open(&row, &self.sealing_key) {
            Ok(plaintext) => Some(plaintext),
            Err(err) => {
                warn!(key, error = %err, "stored credential is unreadable");
                None
            }
        }
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), CredentialError> {
        let sealed = self
            .cipher
            .seal(value, &self.sealing_key)
            .map_err(|e| CredentialError::Crypto(e.to_string()))?;
        let guard = self
            .db
            .lock()
            .map_err(|_| CredentialError::DatabaseError("database lock poisoned".to_string()))?;
        guard
            .connection()
            .execute(
                "INSERT OR REPLACE INTO credentials (key, ciphertext, iv, auth_tag, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![key, sealed.ciphertext, sealed.iv, sealed.auth_tag, Utc::now()],
            )
            .map_err(|e| CredentialError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> bool {
        let Ok(guard) = self.db.lock() else {
            return false;
        };
        guard
            .connection()
            .execute("DELETE FROM credentials WHERE key = ?1", params![key])
            .map(|affected| affected > 0)
            .unwrap_or(false)
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), CredentialError> {
        self.entries
            .lock()
            .map_err(|_| CredentialError::DatabaseError("entry lock poisoned".to_string()))?
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|mut entries| entries.remove(key).is_some())
            .unwrap_or(false)
    }
}
