//! Unit tests for bookmark and highlight repositories: bulk insert, tag
//! fan-out into the join tables, and cascading deletes down the
//! collection → bookmark → highlight chain.

use linkvault::database::Database;
use linkvault::repos::{BookmarkRepo, CollectionRepo, HighlightRepo};
use linkvault::types::bookmark::{Bookmark, PartialBookmark};
use linkvault::types::collection::{Collection, ROOT_COLLECTION_ID};
use linkvault::types::errors::StoreError;
use linkvault::types::highlight::{Highlight, PartialHighlight};

fn setup() -> Database {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    // Bookmarks need a resolvable parent collection.
    CollectionRepo::new(db.connection())
        .bulk_insert(&[Collection {
            id: "c1".to_string(),
            name: "Reading".to_string(),
            parent_id: ROOT_COLLECTION_ID.to_string(),
            is_favorite: false,
            updated_at: None,
            owner_id: "u1".to_string(),
        }])
        .unwrap();
    db
}

fn bookmark(id: &str, tags: &[&str]) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        title: format!("title-{id}"),
        url: format!("https://example.com/{id}"),
        domain: "example.com".to_string(),
        parent_id: "c1".to_string(),
        is_favorite: false,
        updated_at: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn highlight(id: &str, bookmark_id: &str, tags: &[&str]) -> Highlight {
    Highlight {
        id: id.to_string(),
        bookmark_id: bookmark_id.to_string(),
        color: "yellow".to_string(),
        is_sticky: false,
        is_favorite: false,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

#[test]
fn test_bulk_insert_roundtrips_bookmarks() {
    let db = setup();
    let repo = BookmarkRepo::new(db.connection());

    repo.bulk_insert(&[bookmark("b1", &[]), bookmark("b2", &["rust"])])
        .unwrap();

    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), 2);
    let b2 = repo.get("b2").unwrap().unwrap();
    assert_eq!(b2.tags, vec!["rust"]);
    assert_eq!(b2.parent_id, "c1");
}

#[test]
fn test_bulk_insert_fans_tags_out_to_join_table() {
    let db = setup();
    let repo = BookmarkRepo::new(db.connection());

    repo.bulk_insert(&[bookmark("b1", &["rust", "async"])]).unwrap();

    assert_eq!(repo.tag_rows("b1").unwrap(), vec!["async", "rust"]);
}

#[test]
fn test_replay_rewrites_join_rows() {
    let db = setup();
    let repo = BookmarkRepo::new(db.connection());

    repo.bulk_insert(&[bookmark("b1", &["old"])]).unwrap();
    repo.bulk_insert(&[bookmark("b1", &["new"])]).unwrap();

    assert_eq!(
        repo.tag_rows("b1").unwrap(),
        vec!["new"],
        "stale join rows must not survive a replay"
    );
    assert_eq!(repo.get_all().unwrap().len(), 1);
}

#[test]
fn test_empty_tags_produce_no_join_rows() {
    let db = setup();
    let repo = BookmarkRepo::new(db.connection());

    repo.bulk_insert(&[bookmark("b1", &[])]).unwrap();

    assert!(repo.tag_rows("b1").unwrap().is_empty());
    assert!(repo.get("b1").unwrap().unwrap().tags.is_empty());
}

#[test]
fn test_highlights_attach_to_bookmarks() {
    let db = setup();
    BookmarkRepo::new(db.connection())
        .bulk_insert(&[bookmark("b1", &[])])
        .unwrap();
    let highlights = HighlightRepo::new(db.connection());

    highlights
        .create(&highlight("h1", "b1", &["important"]))
        .unwrap();
    highlights.bulk_insert(&[highlight("h2", "b1", &[])]).unwrap();

    assert_eq!(highlights.get_for_bookmark("b1").unwrap().len(), 2);
    assert_eq!(highlights.tag_rows("h1").unwrap(), vec!["important"]);
    let err = highlights.create(&highlight("h1", "b1", &[])).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(_)));
}

#[test]
fn test_missing_parent_is_a_database_error_not_a_duplicate() {
    let db = setup();
    let repo = BookmarkRepo::new(db.connection());

    let mut orphan = bookmark("b1", &[]);
    orphan.parent_id = "no-such-collection".to_string();

    let err = repo.create(&orphan).unwrap_err();
    assert!(matches!(err, StoreError::DatabaseError(_)));
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn test_deleting_collection_cascades_through_bookmarks_and_highlights() {
    let db = setup();
    let bookmarks = BookmarkRepo::new(db.connection());
    let highlights = HighlightRepo::new(db.connection());
    bookmarks.bulk_insert(&[bookmark("b1", &["t"])]).unwrap();
    highlights
        .bulk_insert(&[highlight("h1", "b1", &["t"])])
        .unwrap();

    CollectionRepo::new(db.connection()).delete("c1").unwrap();

    assert!(bookmarks.get("b1").unwrap().is_none());
    assert!(highlights.get("h1").unwrap().is_none());
    assert!(bookmarks.tag_rows("b1").unwrap().is_empty());
    assert!(highlights.tag_rows("h1").unwrap().is_empty());
}

#[test]
fn test_update_applies_only_present_fields() {
    let db = setup();
    let repo = BookmarkRepo::new(db.connection());
    repo.bulk_insert(&[bookmark("b1", &["old"])]).unwrap();

    let fields: PartialBookmark = serde_json::from_value(serde_json::json!({
        "title": "New title",
        "isFavorite": 1,
    }))
    .unwrap();
    repo.update("b1", &fields).unwrap();

    let row = repo.get("b1").unwrap().unwrap();
    assert_eq!(row.title, "New title");
    assert!(row.is_favorite);
    assert_eq!(row.url, "https://example.com/b1", "absent field untouched");
    assert_eq!(row.tags, vec!["old"], "absent tags leave join rows alone");
    assert_eq!(repo.tag_rows("b1").unwrap(), vec!["old"]);
}

#[test]
fn test_update_with_tags_rewrites_join_rows() {
    let db = setup();
    let repo = BookmarkRepo::new(db.connection());
    repo.bulk_insert(&[bookmark("b1", &["old"])]).unwrap();

    let fields = PartialBookmark {
        tags: Some(vec!["fresh".to_string()]),
        ..Default::default()
    };
    repo.update("b1", &fields).unwrap();

    assert_eq!(repo.tag_rows("b1").unwrap(), vec!["fresh"]);
}

#[test]
fn test_update_missing_bookmark_is_not_found() {
    let db = setup();
    let repo = BookmarkRepo::new(db.connection());
    let err = repo.update("ghost", &PartialBookmark::default()).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn test_delete_bookmark_cascades_to_highlights() {
    let db = setup();
    let bookmarks = BookmarkRepo::new(db.connection());
    let highlights = HighlightRepo::new(db.connection());
    bookmarks.create(&bookmark("b1", &["t"])).unwrap();
    highlights
        .bulk_insert(&[highlight("h1", "b1", &["t"])])
        .unwrap();

    bookmarks.delete("b1").unwrap();

    assert!(bookmarks.get("b1").unwrap().is_none());
    assert!(highlights.get("h1").unwrap().is_none());
    assert!(bookmarks.tag_rows("b1").unwrap().is_empty());
}

#[test]
fn test_update_highlight_color_and_tags() {
    let db = setup();
    BookmarkRepo::new(db.connection())
        .bulk_insert(&[bookmark("b1", &[])])
        .unwrap();
    let highlights = HighlightRepo::new(db.connection());
    highlights
        .bulk_insert(&[highlight("h1", "b1", &["old"])])
        .unwrap();

    let fields: PartialHighlight = serde_json::from_value(serde_json::json!({
        "color": "green",
        "tags": ["new"],
    }))
    .unwrap();
    highlights.update("h1", &fields).unwrap();

    let row = highlights.get("h1").unwrap().unwrap();
    assert_eq!(row.color, "green");
    assert_eq!(highlights.tag_rows("h1").unwrap(), vec!["new"]);
    assert!(!row.is_sticky, "absent flags untouched");

    highlights.delete("h1").unwrap();
    assert!(highlights.get("h1").unwrap().is_none());
}

#[test]
fn test_wire_decode_defaults_parent_to_root() {
    // Bookmarks arriving without a parent land at the root collection.
    let decoded: Bookmark = serde_json::from_value(serde_json::json!({
        "_id": "b9",
        "title": "No parent",
    }))
    .unwrap();
    assert_eq!(decoded.parent_id, ROOT_COLLECTION_ID);
    assert_eq!(decoded.url, "");
}

#[test]
fn test_wire_decode_accepts_comma_joined_tags() {
    let decoded: Bookmark = serde_json::from_value(serde_json::json!({
        "_id": "b9",
        "title": "Tagged",
        "tags": "one,two",
    }))
    .unwrap();
    assert_eq!(decoded.tags, vec!["one", "two"]);
}
