//! Bookmark repository.
//!
//! Tags are persisted twice: comma-joined in the `tags` column and as rows in
//! `bookmark_tags`. Every bulk insert rewrites the join rows from the
//! denormalized list so the two stay consistent.

use rusqlite::{params, Connection};
use tracing::warn;

use crate::types::bookmark::{Bookmark, PartialBookmark};
use crate::types::errors::StoreError;

pub struct BookmarkRepo<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarkRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get_all(&self) -> Result<Vec<Bookmark>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, url, domain, parent_id, is_favorite, updated_at, tags \
             FROM bookmarks",
        )?;
        let rows = stmt.query_map([], Self::row_to_bookmark)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn get(&self, id: &str) -> Result<Option<Bookmark>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, url, domain, parent_id, is_favorite, updated_at, tags \
             FROM bookmarks WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::row_to_bookmark)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn create(&self, item: &Bookmark) -> Result<(), StoreError> {
        self.insert_row(self.conn, item, false)?;
        self.rewrite_tag_rows(self.conn, item)?;
        Ok(())
    }

    /// All-or-nothing batch insert; join-table rows are re-derived from each
    /// bookmark's denormalized tag list inside the same transaction.
    pub fn bulk_insert(&self, items: &[Bookmark]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        for bookmark in items {
            self.insert_row(&tx, bookmark, true)?;
            self.rewrite_tag_rows(&tx, bookmark)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Returns the join-table tags for one bookmark, ordered.
    pub fn tag_rows(&self, bookmark_id: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM bookmark_tags WHERE bookmark_id = ?1 ORDER BY tag")?;
        let rows = stmt.query_map(params![bookmark_id], |row| row.get(0))?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Fetch-merge-update; a tag list in the partial also rewrites the join
    /// rows. Unparsable timestamps are logged and skipped.
    pub fn update(&self, id: &str, fields: &PartialBookmark) -> Result<(), StoreError> {
        let mut bookmark = self
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(title) = &fields.title {
            bookmark.title = title.clone();
        }
        if let Some(url) = &fields.url {
            bookmark.url = url.clone();
        }
        if let Some(domain) = &fields.domain {
            bookmark.domain = domain.clone();
        }
        if let Some(parent_id) = &fields.parent_id {
            bookmark.parent_id = parent_id.clone();
        }
        if let Some(is_favorite) = fields.is_favorite {
            bookmark.is_favorite = is_favorite;
        }
        if let Some(raw) = &fields.updated_at {
            match raw.parse() {
                Some(instant) => bookmark.updated_at = Some(instant),
                None => warn!(bookmark = id, "unparsable updatedAt, field skipped"),
            }
        }
        if let Some(tags) = &fields.tags {
            bookmark.tags = tags.clone();
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE bookmarks SET title = ?1, url = ?2, domain = ?3, parent_id = ?4, \
             is_favorite = ?5, updated_at = ?6, tags = ?7 WHERE id = ?8",
            params![
                bookmark.title,
                bookmark.url,
                bookmark.domain,
                bookmark.parent_id,
                bookmark.is_favorite,
                bookmark.updated_at,
                bookmark.tags.join(","),
                id
            ],
        )?;
        if fields.tags.is_some() {
            self.rewrite_tag_rows(&tx, &bookmark)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn insert_row(
        &self,
        conn: &Connection,
        item: &Bookmark,
        replace: bool,
    ) -> Result<(), StoreError> {
        let sql = if replace {
            "INSERT OR REPLACE INTO bookmarks \
             (id, title, url, domain, parent_id, is_favorite, updated_at, tags) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        } else {
            "INSERT INTO bookmarks \
             (id, title, url, domain, parent_id, is_favorite, updated_at, tags) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        };
        conn.execute(
            sql,
            params![
                item.id,
                item.title,
                item.url,
                item.domain,
                item.parent_id,
                item.is_favorite,
                item.updated_at,
                item.tags.join(",")
            ],
        )?;
        Ok(())
    }

    fn rewrite_tag_rows(&self, conn: &Connection, item: &Bookmark) -> Result<(), StoreError> {
        conn.execute(
            "DELETE FROM bookmark_tags WHERE bookmark_id = ?1",
            params![item.id],
        )?;
        for tag in &item.tags {
            conn.execute(
                "INSERT OR IGNORE INTO bookmark_tags (bookmark_id, tag) VALUES (?1, ?2)",
                params![item.id, tag],
            )?;
        }
        Ok(())
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        let joined: Option<String> = row.get(7)?;
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            domain: row.get(3)?,
            parent_id: row.get(4)?,
            is_favorite: row.get(5)?,
            updated_at: row.get(6)?,
            tags: joined
                .filter(|s| !s.is_empty())
                .map(|s| s.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}
