//! User settings persistence. A single row holds the whole settings document
//! as JSON; partial updates are applied by deep-merging into the decoded
//! document and writing the result back.

use rusqlite::{params, Connection};
use tracing::warn;

use crate::types::errors::StoreError;
use crate::types::settings::{
    PartialUserSettings, SettingsRecord, UserSettings, SETTINGS_ROW_ID,
};

pub struct SettingsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> SettingsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self) -> Result<Option<SettingsRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, settings FROM settings WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![SETTINGS_ROW_ID], |row| {
            Ok(SettingsRecord {
                id: row.get(0)?,
                document: row.get(1)?,
            })
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Decodes the stored document, falling back to defaults when the row is
    /// missing or the JSON no longer parses.
    pub fn load_settings(&self) -> Result<UserSettings, StoreError> {
        let record = match self.get()? {
            Some(record) => record,
            None => return Ok(UserSettings::default()),
        };
        match serde_json::from_str(&record.document) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!(error = %err, "stored settings document is unreadable, using defaults");
                Ok(UserSettings::default())
            }
        }
    }

    pub fn create(&self, settings: &UserSettings) -> Result<(), StoreError> {
        let document = serde_json::to_string(settings)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        self.conn.execute(
            "INSERT INTO settings (id, settings) VALUES (?1, ?2)",
            params![SETTINGS_ROW_ID, document],
        )?;
        Ok(())
    }

    /// Upsert used when the server hands us a fresh settings document.
    pub fn save(&self, settings: &UserSettings) -> Result<(), StoreError> {
        let document = serde_json::to_string(settings)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (id, settings) VALUES (?1, ?2)",
            params![SETTINGS_ROW_ID, document],
        )?;
        Ok(())
    }

    pub fn update(&self, fields: &PartialUserSettings) -> Result<(), StoreError> {
        if self.get()?.is_none() {
            return Err(StoreError::NotFound(SETTINGS_ROW_ID.to_string()));
        }
        let mut settings = self.load_settings()?;
        settings.merge(fields);
        let document = serde_json::to_string(&settings)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        self.conn.execute(
            "UPDATE settings SET settings = ?1 WHERE id = ?2",
            params![document, SETTINGS_ROW_ID],
        )?;
        Ok(())
    }
}
