//! SQLite connection management for linkvault.
//!
//! Wraps a `rusqlite::Connection` and stamps the schema on open. Foreign
//! keys are always enabled; the cascading constraints in the schema are what
//! keep the hierarchy referentially intact under remote mutations.

use rusqlite::Connection;
use std::path::Path;
use tracing::warn;

use super::migrations;

/// Core database wrapper providing SQLite connection management.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) a SQLite database at the given file path.
    ///
    /// If the stamped schema version differs from
    /// [`migrations::SCHEMA_VERSION`], every table is dropped and recreated.
    /// Acceptable because the store is a cache, not the source of truth.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or
    /// schema creation fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.prepare_schema()?;
        Ok(db)
    }

    /// Opens an in-memory SQLite database. Discarded on drop; used by tests
    /// and the demo binary.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.prepare_schema()?;
        Ok(db)
    }

    fn prepare_schema(&self) -> Result<(), rusqlite::Error> {
        if migrations::stamped_version(&self.conn) != migrations::SCHEMA_VERSION {
            warn!(
                expected = migrations::SCHEMA_VERSION,
                found = migrations::stamped_version(&self.conn),
                "schema version mismatch, recreating local store"
            );
            migrations::drop_all(&self.conn)?;
        }
        migrations::create_schema(&self.conn)
    }

    /// Returns a reference to the underlying `rusqlite::Connection`.
    ///
    /// Repositories borrow this to execute queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
