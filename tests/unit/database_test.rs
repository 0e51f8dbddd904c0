//! Unit tests for the database layer: schema creation, version stamping, and
//! recreation on version mismatch.

use linkvault::database::Database;

fn table_names(db: &Database) -> Vec<String> {
    let conn = db.connection();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .filter_map(|r| r.ok())
        .collect()
}

#[test]
fn test_open_in_memory_creates_all_tables() {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let tables = table_names(&db);
    for expected in [
        "bookmark_tags",
        "bookmarks",
        "collections",
        "credentials",
        "highlight_tags",
        "highlights",
        "settings",
        "sync",
        "tags",
    ] {
        assert!(
            tables.iter().any(|t| t == expected),
            "missing table {expected}, got {tables:?}"
        );
    }
}

#[test]
fn test_schema_version_is_stamped() {
    let db = Database::open_in_memory().unwrap();
    let version: i32 = db
        .connection()
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap();
    assert!(version > 0, "user_version should be stamped, got {version}");
}

#[test]
fn test_foreign_keys_are_enabled() {
    let db = Database::open_in_memory().unwrap();
    let enabled: i32 = db
        .connection()
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn test_reopen_preserves_data_when_version_matches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO tags (id, name, parent_id, owner_id, is_favorite) \
                 VALUES ('t1', 'keep-me', '', 'u1', 0)",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1, "matching schema version must not wipe data");
}

#[test]
fn test_version_mismatch_recreates_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO tags (id, name, parent_id, owner_id, is_favorite) \
                 VALUES ('t1', 'stale', '', 'u1', 0)",
                [],
            )
            .unwrap();
        // Simulate a database written by a different schema revision.
        db.connection()
            .execute_batch("PRAGMA user_version = 999")
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0, "mismatched schema version must recreate the store");

    let version: i32 = db
        .connection()
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap();
    assert_ne!(version, 999);
}
