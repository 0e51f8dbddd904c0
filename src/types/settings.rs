//! The nested user-settings document and its deep partial merge.
//!
//! The store serializes the document opaquely; business logic only ever sees
//! the decoded form. A partial document merges field by field: absent fields
//! leave the current value alone, down to the leaves.

use serde::{Deserialize, Serialize};

/// Fixed primary key of the settings singleton row.
pub const SETTINGS_ROW_ID: &str = "1";

/// The decoded settings document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSettings {
    pub dock: DockSettings,
    pub sidebar: SidebarSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DockSettings {
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SidebarSettings {
    pub position: String,
    pub size: f64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            dock: DockSettings { size: 1 },
            sidebar: SidebarSettings {
                position: "left".to_string(),
                size: 10.0,
            },
        }
    }
}

/// Partial mirror of [`UserSettings`]; every field optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialUserSettings {
    pub dock: Option<PartialDockSettings>,
    pub sidebar: Option<PartialSidebarSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialDockSettings {
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialSidebarSettings {
    pub position: Option<String>,
    pub size: Option<f64>,
}

impl UserSettings {
    /// Deep partial merge: only fields present in `partial` are overwritten.
    pub fn merge(&mut self, partial: &PartialUserSettings) {
        if let Some(dock) = &partial.dock {
            if let Some(size) = dock.size {
                self.dock.size = size;
            }
        }
        if let Some(sidebar) = &partial.sidebar {
            if let Some(position) = &sidebar.position {
                self.sidebar.position = position.clone();
            }
            if let Some(size) = sidebar.size {
                self.sidebar.size = size;
            }
        }
    }
}

/// The persisted settings row: singleton id plus the raw JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRecord {
    pub id: String,
    pub document: String,
}
