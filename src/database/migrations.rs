//! Schema creation for the linkvault SQLite store.
//!
//! The schema version is stamped into `PRAGMA user_version`. There are no
//! incremental migrations: the store is a cache of remote state, so a version
//! bump drops everything and lets the next sync repopulate it.

use rusqlite::Connection;

/// Current schema version. Bump this when the schema changes.
pub const SCHEMA_VERSION: i32 = 1;

/// Returns the version stamped into the database (0 for a fresh file).
pub fn stamped_version(conn: &Connection) -> i32 {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap_or(0)
}

/// Drops every linkvault table. Called on version mismatch before recreating.
pub fn drop_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA foreign_keys = OFF;
         DROP TABLE IF EXISTS highlight_tags;
         DROP TABLE IF EXISTS bookmark_tags;
         DROP TABLE IF EXISTS highlights;
         DROP TABLE IF EXISTS bookmarks;
         DROP TABLE IF EXISTS collections;
         DROP TABLE IF EXISTS tags;
         DROP TABLE IF EXISTS settings;
         DROP TABLE IF EXISTS sync;
         DROP TABLE IF EXISTS credentials;
         PRAGMA foreign_keys = ON;",
    )
}

/// Creates all tables and stamps the schema version. Idempotent: uses
/// `CREATE TABLE IF NOT EXISTS`, safe to call on every open.
pub fn create_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS collections (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            parent_id TEXT NOT NULL,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT,
            owner_id TEXT NOT NULL,
            FOREIGN KEY (parent_id) REFERENCES collections(id)
                ON DELETE CASCADE ON UPDATE CASCADE
        );

        CREATE TABLE IF NOT EXISTS tags (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            parent_id TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            is_favorite INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS bookmarks (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            url TEXT NOT NULL,
            domain TEXT NOT NULL,
            parent_id TEXT NOT NULL,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT,
            tags TEXT,
            FOREIGN KEY (parent_id) REFERENCES collections(id)
                ON DELETE CASCADE ON UPDATE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_bookmarks_parent ON bookmarks(parent_id);
        CREATE INDEX IF NOT EXISTS idx_bookmarks_domain ON bookmarks(domain);

        CREATE TABLE IF NOT EXISTS highlights (
            id TEXT PRIMARY KEY NOT NULL,
            bookmark_id TEXT NOT NULL,
            color TEXT NOT NULL,
            is_sticky INTEGER NOT NULL DEFAULT 0,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            tags TEXT,
            FOREIGN KEY (bookmark_id) REFERENCES bookmarks(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS bookmark_tags (
            bookmark_id TEXT NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (bookmark_id, tag),
            FOREIGN KEY (bookmark_id) REFERENCES bookmarks(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS highlight_tags (
            highlight_id TEXT NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (highlight_id, tag),
            FOREIGN KEY (highlight_id) REFERENCES highlights(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS settings (
            id TEXT PRIMARY KEY NOT NULL,
            settings TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sync (
            id TEXT PRIMARY KEY NOT NULL,
            sync_id INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS credentials (
            key TEXT PRIMARY KEY NOT NULL,
            ciphertext BLOB NOT NULL,
            iv BLOB NOT NULL,
            auth_tag BLOB NOT NULL,
            updated_at TEXT NOT NULL
        );
        ",
    )?;

    conn.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
}
