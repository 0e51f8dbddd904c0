use std::fmt;

// === StoreError ===

/// Errors raised by the entity repositories and the local store.
#[derive(Debug)]
pub enum StoreError {
    /// A row with the given id already exists.
    DuplicateKey(String),
    /// No row with the given id exists.
    NotFound(String),
    /// A collection batch contains a parent cycle; nothing was inserted.
    CircularHierarchy(String),
    /// Underlying SQLite operation failed.
    DatabaseError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateKey(id) => write!(f, "Duplicate key: {}", id),
            StoreError::NotFound(id) => write!(f, "Row not found: {}", id),
            StoreError::CircularHierarchy(id) => {
                write!(f, "Circular hierarchy detected at: {}", id)
            }
            StoreError::DatabaseError(msg) => write!(f, "Store database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        // Only a primary-key or unique collision is a duplicate; other
        // constraint failures (foreign key, check) are plain database errors.
        if let rusqlite::Error::SqliteFailure(e, _) = &err {
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            {
                return StoreError::DuplicateKey(err.to_string());
            }
        }
        StoreError::DatabaseError(err.to_string())
    }
}

// === MutationError ===

/// Errors raised while decoding or applying a remote mutation.
#[derive(Debug)]
pub enum MutationError {
    /// The mutation data carries no `_id` for a collection that needs one.
    MissingIdentifier,
    /// A settings create is missing its nested `settings` object.
    MissingSettings,
    /// The envelope names a collection the pipeline does not dispatch to.
    UnknownCollection(String),
    /// The envelope names an operation outside create/update/delete.
    UnknownOperation(String),
    /// The operation is represented but deliberately not implemented.
    NotImplemented(String),
    /// The mutation payload could not be decoded into a typed variant.
    Decode(String),
    /// The repository rejected the mutation.
    Store(StoreError),
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::MissingIdentifier => write!(f, "Missing _id in mutation data"),
            MutationError::MissingSettings => {
                write!(f, "Missing 'settings' object in mutation data")
            }
            MutationError::UnknownCollection(name) => write!(f, "Unknown collection: {}", name),
            MutationError::UnknownOperation(name) => write!(f, "Unknown operation: {}", name),
            MutationError::NotImplemented(name) => {
                write!(f, "Operation not implemented: {}", name)
            }
            MutationError::Decode(msg) => write!(f, "Mutation decode error: {}", msg),
            MutationError::Store(err) => write!(f, "Mutation store error: {}", err),
        }
    }
}

impl std::error::Error for MutationError {}

impl From<StoreError> for MutationError {
    fn from(err: StoreError) -> Self {
        MutationError::Store(err)
    }
}

impl MutationError {
    /// Decode failures are skip-and-log during delta application; everything
    /// else is an integrity failure that blocks cursor advancement.
    pub fn is_integrity_failure(&self) -> bool {
        !matches!(self, MutationError::Decode(_))
    }
}

// === TransportError ===

/// Errors raised by the HTTP transport.
#[derive(Debug)]
pub enum TransportError {
    /// Network-level failure (DNS, connect, timeout).
    Network(String),
    /// The server answered with a non-success HTTP status.
    Http(u16),
    /// The session token was rejected.
    Unauthorized,
    /// The response body could not be decoded.
    Decode(String),
    /// A credential could not be persisted after login.
    Credential(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "Transport network error: {}", msg),
            TransportError::Http(status) => write!(f, "HTTP error, status: {}", status),
            TransportError::Unauthorized => write!(f, "Session token rejected"),
            TransportError::Decode(msg) => write!(f, "Transport decode error: {}", msg),
            TransportError::Credential(msg) => {
                write!(f, "Credential persistence error: {}", msg)
            }
        }
    }
}

impl std::error::Error for TransportError {}

// === SyncError ===

/// Errors surfaced from a sync phase (bootstrap, delta, live-tail).
#[derive(Debug)]
pub enum SyncError {
    Transport(TransportError),
    Store(StoreError),
    Mutation(MutationError),
    /// The delta batch applied with integrity failures; cursor not advanced.
    DeltaIncomplete(usize),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Transport(err) => write!(f, "Sync transport error: {}", err),
            SyncError::Store(err) => write!(f, "Sync store error: {}", err),
            SyncError::Mutation(err) => write!(f, "Sync mutation error: {}", err),
            SyncError::DeltaIncomplete(count) => {
                write!(f, "Delta sync finished with {} failed records", count)
            }
        }
    }
}

impl std::error::Error for SyncError {}

impl From<TransportError> for SyncError {
    fn from(err: TransportError) -> Self {
        SyncError::Transport(err)
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        SyncError::Store(err)
    }
}

impl From<MutationError> for SyncError {
    fn from(err: MutationError) -> Self {
        SyncError::Mutation(err)
    }
}

// === CryptoError ===

/// Errors related to cryptographic operations.
#[derive(Debug)]
pub enum CryptoError {
    /// Failed to derive an encryption key.
    KeyDerivation(String),
    /// Encryption operation failed.
    Encryption(String),
    /// Decryption operation failed.
    Decryption(String),
    /// Failed to generate random bytes.
    RandomGeneration(String),
    /// The provided key is invalid.
    InvalidKey(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::KeyDerivation(msg) => write!(f, "Key derivation failed: {}", msg),
            CryptoError::Encryption(msg) => write!(f, "Encryption failed: {}", msg),
            CryptoError::Decryption(msg) => write!(f, "Decryption failed: {}", msg),
            CryptoError::RandomGeneration(msg) => {
                write!(f, "Random generation failed: {}", msg)
            }
            CryptoError::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}

// === CredentialError ===

/// Errors related to the credential store.
#[derive(Debug)]
pub enum CredentialError {
    /// Cryptographic operation failed while sealing a credential.
    Crypto(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Crypto(msg) => write!(f, "Credential crypto error: {}", msg),
            CredentialError::DatabaseError(msg) => {
                write!(f, "Credential database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for CredentialError {}
