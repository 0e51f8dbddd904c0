//! Unit tests for the settings repository: singleton row semantics, deep
//! partial merge on update, and graceful handling of unreadable documents.

use linkvault::database::Database;
use linkvault::repos::SettingsRepo;
use linkvault::types::errors::StoreError;
use linkvault::types::settings::{
    PartialUserSettings, UserSettings, SETTINGS_ROW_ID,
};

fn setup() -> Database {
    Database::open_in_memory().expect("Failed to open in-memory database")
}

#[test]
fn test_get_on_empty_store_is_none() {
    let db = setup();
    let repo = SettingsRepo::new(db.connection());
    assert!(repo.get().unwrap().is_none());
}

#[test]
fn test_load_settings_defaults_when_missing() {
    let db = setup();
    let repo = SettingsRepo::new(db.connection());
    assert_eq!(repo.load_settings().unwrap(), UserSettings::default());
}

#[test]
fn test_create_persists_singleton_row() {
    let db = setup();
    let repo = SettingsRepo::new(db.connection());

    let mut settings = UserSettings::default();
    settings.dock.size = 3;
    repo.create(&settings).unwrap();

    let record = repo.get().unwrap().unwrap();
    assert_eq!(record.id, SETTINGS_ROW_ID);
    assert_eq!(repo.load_settings().unwrap().dock.size, 3);
}

#[test]
fn test_create_twice_is_duplicate_key() {
    let db = setup();
    let repo = SettingsRepo::new(db.connection());
    repo.create(&UserSettings::default()).unwrap();
    let err = repo.create(&UserSettings::default()).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(_)), "got {err:?}");
}

#[test]
fn test_save_upserts() {
    let db = setup();
    let repo = SettingsRepo::new(db.connection());

    repo.save(&UserSettings::default()).unwrap();
    let mut replacement = UserSettings::default();
    replacement.sidebar.position = "right".to_string();
    repo.save(&replacement).unwrap();

    assert_eq!(repo.load_settings().unwrap().sidebar.position, "right");
}

#[test]
fn test_update_merges_into_existing_document() {
    let db = setup();
    let repo = SettingsRepo::new(db.connection());
    let mut initial = UserSettings::default();
    initial.sidebar.position = "right".to_string();
    repo.create(&initial).unwrap();

    let fields: PartialUserSettings =
        serde_json::from_value(serde_json::json!({"dock": {"size": 5}})).unwrap();
    repo.update(&fields).unwrap();

    let merged = repo.load_settings().unwrap();
    assert_eq!(merged.dock.size, 5);
    assert_eq!(
        merged.sidebar.position, "right",
        "untouched leaves must survive the merge"
    );
}

#[test]
fn test_update_without_row_is_not_found() {
    let db = setup();
    let repo = SettingsRepo::new(db.connection());
    let err = repo.update(&PartialUserSettings::default()).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn test_corrupt_document_falls_back_to_defaults() {
    let db = setup();
    db.connection()
        .execute(
            "INSERT INTO settings (id, settings) VALUES (?1, 'not json')",
            [SETTINGS_ROW_ID],
        )
        .unwrap();

    let repo = SettingsRepo::new(db.connection());
    assert_eq!(repo.load_settings().unwrap(), UserSettings::default());
}
