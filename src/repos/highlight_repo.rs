//! Highlight repository. Mirrors the bookmark repo's tag fan-out, but
//! highlights hang off bookmarks rather than collections.

use rusqlite::{params, Connection};

use crate::types::errors::StoreError;
use crate::types::highlight::{Highlight, PartialHighlight};

pub struct HighlightRepo<'a> {
    conn: &'a Connection,
}

impl<'a> HighlightRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get_all(&self) -> Result<Vec<Highlight>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, bookmark_id, color, is_sticky, is_favorite, tags FROM highlights",
        )?;
        let rows = stmt.query_map([], Self::row_to_highlight)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn get(&self, id: &str) -> Result<Option<Highlight>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, bookmark_id, color, is_sticky, is_favorite, tags \
             FROM highlights WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::row_to_highlight)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn get_for_bookmark(&self, bookmark_id: &str) -> Result<Vec<Highlight>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, bookmark_id, color, is_sticky, is_favorite, tags \
             FROM highlights WHERE bookmark_id = ?1",
        )?;
        let rows = stmt.query_map(params![bookmark_id], Self::row_to_highlight)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn create(&self, item: &Highlight) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO highlights (id, bookmark_id, color, is_sticky, is_favorite, tags) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.id,
                item.bookmark_id,
                item.color,
                item.is_sticky,
                item.is_favorite,
                item.tags.join(",")
            ],
        )?;
        for tag in &item.tags {
            self.conn.execute(
                "INSERT OR IGNORE INTO highlight_tags (highlight_id, tag) VALUES (?1, ?2)",
                params![item.id, tag],
            )?;
        }
        Ok(())
    }

    pub fn bulk_insert(&self, items: &[Highlight]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        for highlight in items {
            tx.execute(
                "INSERT OR REPLACE INTO highlights \
                 (id, bookmark_id, color, is_sticky, is_favorite, tags) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    highlight.id,
                    highlight.bookmark_id,
                    highlight.color,
                    highlight.is_sticky,
                    highlight.is_favorite,
                    highlight.tags.join(",")
                ],
            )?;
            tx.execute(
                "DELETE FROM highlight_tags WHERE highlight_id = ?1",
                params![highlight.id],
            )?;
            for tag in &highlight.tags {
                tx.execute(
                    "INSERT OR IGNORE INTO highlight_tags (highlight_id, tag) VALUES (?1, ?2)",
                    params![highlight.id, tag],
                )?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Fetch-merge-update; a tag list in the partial also rewrites the join
    /// rows.
    pub fn update(&self, id: &str, fields: &PartialHighlight) -> Result<(), StoreError> {
        let mut highlight = self
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(color) = &fields.color {
            highlight.color = color.clone();
        }
        if let Some(is_sticky) = fields.is_sticky {
            highlight.is_sticky = is_sticky;
        }
        if let Some(is_favorite) = fields.is_favorite {
            highlight.is_favorite = is_favorite;
        }
        if let Some(tags) = &fields.tags {
            highlight.tags = tags.clone();
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE highlights SET color = ?1, is_sticky = ?2, is_favorite = ?3, tags = ?4 \
             WHERE id = ?5",
            params![
                highlight.color,
                highlight.is_sticky,
                highlight.is_favorite,
                highlight.tags.join(","),
                id
            ],
        )?;
        if fields.tags.is_some() {
            tx.execute(
                "DELETE FROM highlight_tags WHERE highlight_id = ?1",
                params![id],
            )?;
            for tag in &highlight.tags {
                tx.execute(
                    "INSERT OR IGNORE INTO highlight_tags (highlight_id, tag) VALUES (?1, ?2)",
                    params![id, tag],
                )?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let affected = self
            .conn
            .execute("DELETE FROM highlights WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn tag_rows(&self, highlight_id: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM highlight_tags WHERE highlight_id = ?1 ORDER BY tag")?;
        let rows = stmt.query_map(params![highlight_id], |row| row.get(0))?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn row_to_highlight(row: &rusqlite::Row) -> rusqlite::Result<Highlight> {
        let joined: Option<String> = row.get(5)?;
        Ok(Highlight {
            id: row.get(0)?,
            bookmark_id: row.get(1)?,
            color: row.get(2)?,
            is_sticky: row.get(3)?,
            is_favorite: row.get(4)?,
            tags: joined
                .filter(|s| !s.is_empty())
                .map(|s| s.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}
