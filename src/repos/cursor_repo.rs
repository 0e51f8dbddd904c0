//! Durable sync cursor. One row tracks the last server sequence number this
//! client has fully applied; it only moves forward once a batch has landed.

use rusqlite::{params, Connection};

use crate::types::errors::StoreError;

const CURSOR_ROW_ID: &str = "1";

pub struct CursorRepo<'a> {
    conn: &'a Connection,
}

impl<'a> CursorRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self) -> Result<Option<i64>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT sync_id FROM sync WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![CURSOR_ROW_ID], |row| row.get(0))?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn set(&self, sync_id: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sync (id, sync_id) VALUES (?1, ?2)",
            params![CURSOR_ROW_ID, sync_id],
        )?;
        Ok(())
    }
}
