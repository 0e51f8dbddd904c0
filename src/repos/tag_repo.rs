//! Tag repository. Tags mirror the collection hierarchy shape but carry no
//! foreign key, so bulk insert needs no ordering.

use rusqlite::{params, Connection};

use crate::types::errors::StoreError;
use crate::types::tag::{PartialTag, Tag};

pub struct TagRepo<'a> {
    conn: &'a Connection,
}

impl<'a> TagRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get_all(&self) -> Result<Vec<Tag>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, parent_id, owner_id, is_favorite FROM tags")?;
        let rows = stmt.query_map([], Self::row_to_tag)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn get(&self, id: &str) -> Result<Option<Tag>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, parent_id, owner_id, is_favorite FROM tags WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], Self::row_to_tag)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn create(&self, item: &Tag) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO tags (id, name, parent_id, owner_id, is_favorite) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![item.id, item.name, item.parent_id, item.owner_id, item.is_favorite],
        )?;
        Ok(())
    }

    /// All-or-nothing batch insert inside one transaction.
    pub fn bulk_insert(&self, items: &[Tag]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        for tag in items {
            tx.execute(
                "INSERT OR REPLACE INTO tags (id, name, parent_id, owner_id, is_favorite) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![tag.id, tag.name, tag.parent_id, tag.owner_id, tag.is_favorite],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn update(&self, id: &str, fields: &PartialTag) -> Result<(), StoreError> {
        let mut tag = self
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(name) = &fields.name {
            tag.name = name.clone();
        }
        if let Some(parent_id) = &fields.parent_id {
            tag.parent_id = parent_id.clone();
        }
        if let Some(owner_id) = &fields.owner_id {
            tag.owner_id = owner_id.clone();
        }
        if let Some(is_favorite) = fields.is_favorite {
            tag.is_favorite = is_favorite;
        }

        self.conn.execute(
            "UPDATE tags SET name = ?1, parent_id = ?2, owner_id = ?3, is_favorite = ?4 \
             WHERE id = ?5",
            params![tag.name, tag.parent_id, tag.owner_id, tag.is_favorite, id],
        )?;
        Ok(())
    }

    fn row_to_tag(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_id: row.get(2)?,
            owner_id: row.get(3)?,
            is_favorite: row.get(4)?,
        })
    }
}
