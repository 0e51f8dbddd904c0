//! Unit tests for credential storage: sealed-at-rest SQLite store and the
//! in-memory test double.

use std::sync::{Arc, Mutex};

use linkvault::database::Database;
use linkvault::services::{
    CredentialStore, MemoryCredentialStore, SessionCipher, SqliteCredentialStore,
    SESSION_TOKEN_KEY,
};

fn sealing_key() -> Vec<u8> {
    SessionCipher::new()
        .derive_key("test-passphrase", &[9u8; 16])
        .unwrap()
}

fn sqlite_store() -> (Arc<Mutex<Database>>, SqliteCredentialStore) {
    let db = Arc::new(Mutex::new(
        Database::open_in_memory().expect("Failed to open in-memory database"),
    ));
    let store = SqliteCredentialStore::new(Arc::clone(&db), sealing_key());
    (db, store)
}

#[test]
fn test_save_load_roundtrip() {
    let (_db, store) = sqlite_store();
    store.save(SESSION_TOKEN_KEY, b"session-abc").unwrap();
    assert_eq!(store.load(SESSION_TOKEN_KEY).unwrap(), b"session-abc");
}

#[test]
fn test_load_missing_key_is_none() {
    let (_db, store) = sqlite_store();
    assert!(store.load("never-saved").is_none());
}

#[test]
fn test_save_overwrites_previous_value() {
    let (_db, store) = sqlite_store();
    store.save(SESSION_TOKEN_KEY, b"old").unwrap();
    store.save(SESSION_TOKEN_KEY, b"new").unwrap();
    assert_eq!(store.load(SESSION_TOKEN_KEY).unwrap(), b"new");
}

#[test]
fn test_delete_reports_whether_anything_was_removed() {
    let (_db, store) = sqlite_store();
    store.save(SESSION_TOKEN_KEY, b"session").unwrap();
    assert!(store.delete(SESSION_TOKEN_KEY));
    assert!(!store.delete(SESSION_TOKEN_KEY), "second delete finds nothing");
    assert!(store.load(SESSION_TOKEN_KEY).is_none());
}

#[test]
fn test_token_is_not_stored_in_plaintext() {
    let (db, store) = sqlite_store();
    store.save(SESSION_TOKEN_KEY, b"super-secret-session").unwrap();

    let guard = db.lock().unwrap();
    let ciphertext: Vec<u8> = guard
        .connection()
        .query_row(
            "SELECT ciphertext FROM credentials WHERE key = ?1",
            [SESSION_TOKEN_KEY],
            |row| row.get(0),
        )
        .unwrap();
    assert_ne!(ciphertext, b"super-secret-session".to_vec());
}

#[test]
fn test_wrong_key_reads_as_logged_out() {
    let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
    {
        let store = SqliteCredentialStore::new(Arc::clone(&db), sealing_key());
        store.save(SESSION_TOKEN_KEY, b"session").unwrap();
    }

    let other_key = SessionCipher::new()
        .derive_key("different-passphrase", &[9u8; 16])
        .unwrap();
    let store = SqliteCredentialStore::new(db, other_key);
    assert!(
        store.load(SESSION_TOKEN_KEY).is_none(),
        "an unreadable credential must read as absent, not as an error"
    );
}

#[test]
fn test_with_passphrase_roundtrip() {
    let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
    let salt = [3u8; 16];
    {
        let store =
            SqliteCredentialStore::with_passphrase(Arc::clone(&db), "hunter2", &salt).unwrap();
        store.save(SESSION_TOKEN_KEY, b"session").unwrap();
    }
    let store = SqliteCredentialStore::with_passphrase(db, "hunter2", &salt).unwrap();
    assert_eq!(store.load(SESSION_TOKEN_KEY).unwrap(), b"session");
}

#[test]
fn test_memory_store_roundtrip() {
    let store = MemoryCredentialStore::new();
    store.save("k", b"v").unwrap();
    assert_eq!(store.load("k").unwrap(), b"v");
    assert!(store.delete("k"));
    assert!(store.load("k").is_none());
}
