//! Unit tests for the collection repository: hierarchy-ordered bulk insert,
//! root synthesis, cycle rejection, and partial updates.

use linkvault::database::Database;
use linkvault::repos::CollectionRepo;
use linkvault::types::collection::{Collection, PartialCollection, ROOT_COLLECTION_ID};
use linkvault::types::errors::StoreError;

fn setup() -> Database {
    Database::open_in_memory().expect("Failed to open in-memory database")
}

fn collection(id: &str, name: &str, parent: &str) -> Collection {
    Collection {
        id: id.to_string(),
        name: name.to_string(),
        parent_id: parent.to_string(),
        is_favorite: false,
        updated_at: None,
        owner_id: "u1".to_string(),
    }
}

#[test]
fn test_bulk_insert_synthesizes_root() {
    let db = setup();
    let repo = CollectionRepo::new(db.connection());

    repo.bulk_insert(&[collection("a", "A", ROOT_COLLECTION_ID)])
        .unwrap();

    let root = repo.get(ROOT_COLLECTION_ID).unwrap().expect("root missing");
    assert_eq!(root.parent_id, ROOT_COLLECTION_ID);
    assert!(repo.get("a").unwrap().is_some());
}

#[test]
fn test_bulk_insert_orders_children_after_parents() {
    let db = setup();
    let repo = CollectionRepo::new(db.connection());

    // Deliberately listed child-first; the repo must reorder before insert
    // or the parent foreign key would reject the child.
    let batch = vec![
        collection("grandchild", "GC", "child"),
        collection("child", "C", "parent"),
        collection("parent", "P", ROOT_COLLECTION_ID),
    ];
    repo.bulk_insert(&batch).unwrap();

    let all = repo.get_all().unwrap();
    // root + the three inserted
    assert_eq!(all.len(), 4);
    assert_eq!(repo.get("grandchild").unwrap().unwrap().parent_id, "child");
}

#[test]
fn test_bulk_insert_rejects_cycle_and_inserts_nothing() {
    let db = setup();
    let repo = CollectionRepo::new(db.connection());

    let batch = vec![
        collection("x", "X", "y"),
        collection("y", "Y", "x"),
        collection("ok", "Ok", ROOT_COLLECTION_ID),
    ];
    let err = repo.bulk_insert(&batch).unwrap_err();
    assert!(matches!(err, StoreError::CircularHierarchy(_)), "got {err:?}");

    // The whole batch rolls back, including the member that was not part of
    // the cycle.
    assert!(repo.get("ok").unwrap().is_none());
    assert!(repo.get(ROOT_COLLECTION_ID).unwrap().is_none());
}

#[test]
fn test_bulk_insert_rejects_self_parent_outside_root() {
    let db = setup();
    let repo = CollectionRepo::new(db.connection());

    let err = repo
        .bulk_insert(&[collection("selfie", "S", "selfie")])
        .unwrap_err();
    assert!(matches!(err, StoreError::CircularHierarchy(_)));
}

#[test]
fn test_bulk_insert_is_idempotent() {
    let db = setup();
    let repo = CollectionRepo::new(db.connection());

    let batch = vec![collection("a", "A", ROOT_COLLECTION_ID)];
    repo.bulk_insert(&batch).unwrap();
    let mut renamed = batch.clone();
    renamed[0].name = "A renamed".to_string();
    repo.bulk_insert(&renamed).unwrap();

    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), 2, "replay must replace, not duplicate");
    assert_eq!(repo.get("a").unwrap().unwrap().name, "A renamed");
}

#[test]
fn test_create_duplicate_id_reports_duplicate_key() {
    let db = setup();
    let repo = CollectionRepo::new(db.connection());

    repo.bulk_insert(&[]).unwrap();
    repo.create(&collection("a", "A", ROOT_COLLECTION_ID)).unwrap();
    let err = repo
        .create(&collection("a", "again", ROOT_COLLECTION_ID))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(_)), "got {err:?}");
}

#[test]
fn test_update_applies_only_present_fields() {
    let db = setup();
    let repo = CollectionRepo::new(db.connection());
    repo.bulk_insert(&[collection("a", "A", ROOT_COLLECTION_ID)])
        .unwrap();

    let fields = PartialCollection {
        name: Some("Renamed".to_string()),
        ..Default::default()
    };
    repo.update("a", &fields).unwrap();

    let row = repo.get("a").unwrap().unwrap();
    assert_eq!(row.name, "Renamed");
    assert_eq!(row.parent_id, ROOT_COLLECTION_ID, "absent field must not change");
    assert_eq!(row.owner_id, "u1");
}

#[test]
fn test_update_ignores_unknown_wire_keys() {
    let db = setup();
    let repo = CollectionRepo::new(db.connection());
    repo.bulk_insert(&[collection("a", "A", ROOT_COLLECTION_ID)])
        .unwrap();

    // Unknown keys are dropped at decode time; known ones still apply.
    let fields: PartialCollection = serde_json::from_value(serde_json::json!({
        "name": "New",
        "someFutureField": {"nested": true},
    }))
    .unwrap();
    repo.update("a", &fields).unwrap();
    assert_eq!(repo.get("a").unwrap().unwrap().name, "New");
}

#[test]
fn test_update_skips_unparsable_timestamp() {
    let db = setup();
    let repo = CollectionRepo::new(db.connection());
    repo.bulk_insert(&[collection("a", "A", ROOT_COLLECTION_ID)])
        .unwrap();

    let fields: PartialCollection = serde_json::from_value(serde_json::json!({
        "name": "Stamped",
        "updatedAt": "not-a-date",
    }))
    .unwrap();
    repo.update("a", &fields).unwrap();

    let row = repo.get("a").unwrap().unwrap();
    assert_eq!(row.name, "Stamped", "good fields still apply");
    assert!(row.updated_at.is_none(), "bad timestamp must be skipped");
}

#[test]
fn test_update_missing_row_is_not_found() {
    let db = setup();
    let repo = CollectionRepo::new(db.connection());

    let err = repo
        .update("ghost", &PartialCollection::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn test_delete_cascades_to_descendants() {
    let db = setup();
    let repo = CollectionRepo::new(db.connection());
    repo.bulk_insert(&[
        collection("parent", "P", ROOT_COLLECTION_ID),
        collection("child", "C", "parent"),
    ])
    .unwrap();

    repo.delete("parent").unwrap();
    assert!(repo.get("parent").unwrap().is_none());
    assert!(repo.get("child").unwrap().is_none(), "cascade must remove children");
}
