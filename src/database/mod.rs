//! linkvault database layer.
//!
//! Provides SQLite connection management and schema creation. The local
//! store is a cache of the remote authoritative state: a schema version
//! mismatch recreates it wholesale instead of migrating in place.
//!
//! # Usage
//!
//! ```no_run
//! use linkvault::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("linkvault.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//!
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
