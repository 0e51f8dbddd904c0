//! Collection repository: CRUD, hierarchical bulk insert, partial updates.
//!
//! Bulk insert is the hard case: the `collections.parent_id` foreign key is
//! self-referencing, so a batch must be inserted parents-first. Ordering is a
//! depth-first topological sort over the batch itself (not the persisted
//! table); a cycle fails the whole batch with `CircularHierarchy` and rolls
//! everything back.

use std::collections::HashMap;

use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::types::collection::{Collection, PartialCollection, ROOT_COLLECTION_ID};
use crate::types::errors::StoreError;

/// Three-color mark for cycle detection during the depth-first sort.
#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// Collection repository backed by a SQLite connection.
pub struct CollectionRepo<'a> {
    conn: &'a Connection,
}

impl<'a> CollectionRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get_all(&self) -> Result<Vec<Collection>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id, is_favorite, updated_at, owner_id FROM collections",
        )?;
        let rows = stmt.query_map([], Self::row_to_collection)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn get(&self, id: &str) -> Result<Option<Collection>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id, is_favorite, updated_at, owner_id \
             FROM collections WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::row_to_collection)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Inserts a single collection. `DuplicateKey` if the id already exists.
    pub fn create(&self, item: &Collection) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO collections (id, name, parent_id, is_favorite, updated_at, owner_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.id,
                item.name,
                item.parent_id,
                item.is_favorite,
                item.updated_at,
                item.owner_id
            ],
        )?;
        Ok(())
    }

    /// Inserts a batch of collections inside one transaction, parents before
    /// children.
    ///
    /// The synthetic root (`id = "0"`) is inserted first and unconditionally
    /// if absent, so every real collection has a resolvable ancestor chain.
    /// A cycle in the batch aborts with `CircularHierarchy` and leaves the
    /// store untouched.
    pub fn bulk_insert(&self, items: &[Collection]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        let root_exists: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM collections WHERE id = ?1",
            params![ROOT_COLLECTION_ID],
            |row| row.get(0),
        )?;
        if !root_exists {
            let root = Collection::root();
            tx.execute(
                "INSERT INTO collections (id, name, parent_id, is_favorite, updated_at, owner_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    root.id,
                    root.name,
                    root.parent_id,
                    root.is_favorite,
                    root.updated_at,
                    root.owner_id
                ],
            )?;
            debug!("synthetic root collection created");
        }

        let sorted = Self::topological_sort(items)?;
        for collection in &sorted {
            tx.execute(
                "INSERT OR REPLACE INTO collections \
                 (id, name, parent_id, is_favorite, updated_at, owner_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    collection.id,
                    collection.name,
                    collection.parent_id,
                    collection.is_favorite,
                    collection.updated_at,
                    collection.owner_id
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Applies a partial update to an existing collection. Absent fields are
    /// untouched; an unparsable timestamp is logged and skipped, never fatal.
    pub fn update(&self, id: &str, fields: &PartialCollection) -> Result<(), StoreError> {
        let mut collection = self
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(name) = &fields.name {
            collection.name = name.clone();
        }
        if let Some(parent_id) = &fields.parent_id {
            collection.parent_id = parent_id.clone();
        }
        if let Some(is_favorite) = fields.is_favorite {
            collection.is_favorite = is_favorite;
        }
        if let Some(owner_id) = &fields.owner_id {
            collection.owner_id = owner_id.clone();
        }
        if let Some(raw) = &fields.updated_at {
            match raw.parse() {
                Some(instant) => collection.updated_at = Some(instant),
                None => warn!(collection = id, "unparsable updatedAt, field skipped"),
            }
        }

        self.conn.execute(
            "UPDATE collections SET name = ?1, parent_id = ?2, is_favorite = ?3, \
             updated_at = ?4, owner_id = ?5 WHERE id = ?6",
            params![
                collection.name,
                collection.parent_id,
                collection.is_favorite,
                collection.updated_at,
                collection.owner_id,
                id
            ],
        )?;
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let affected = self
            .conn
            .execute("DELETE FROM collections WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Depth-first topological sort over the batch. A node is emitted only
    /// after its parent; parents outside the batch (root, or already
    /// persisted rows) need no ordering.
    fn topological_sort(items: &[Collection]) -> Result<Vec<Collection>, StoreError> {
        let by_id: HashMap<&str, &Collection> =
            items.iter().map(|c| (c.id.as_str(), c)).collect();
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut sorted: Vec<Collection> = Vec::with_capacity(items.len());

        fn visit<'c>(
            node: &'c Collection,
            by_id: &HashMap<&str, &'c Collection>,
            marks: &mut HashMap<&'c str, Mark>,
            sorted: &mut Vec<Collection>,
        ) -> Result<(), StoreError> {
            match marks.get(node.id.as_str()) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::InProgress) => {
                    return Err(StoreError::CircularHierarchy(node.id.clone()));
                }
                None => {}
            }
            marks.insert(&node.id, Mark::InProgress);
            if node.parent_id == node.id {
                // Only the root may be its own parent.
                if node.id != ROOT_COLLECTION_ID {
                    return Err(StoreError::CircularHierarchy(node.id.clone()));
                }
            } else if let Some(parent) = by_id.get(node.parent_id.as_str()) {
                visit(parent, by_id, marks, sorted)?;
            }
            marks.insert(&node.id, Mark::Done);
            sorted.push(node.clone());
            Ok(())
        }

        for item in items {
            visit(item, &by_id, &mut marks, &mut sorted)?;
        }
        Ok(sorted)
    }

    fn row_to_collection(row: &rusqlite::Row) -> rusqlite::Result<Collection> {
        Ok(Collection {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_id: row.get(2)?,
            is_favorite: row.get(3)?,
            updated_at: row.get(4)?,
            owner_id: row.get(5)?,
        })
    }
}
