//! Shared handle over the database plus a change-notification fan-out.
//!
//! All writers go through the one `Mutex<Database>`, so SQLite only ever sees
//! a single writer. Subscribers are plain callbacks invoked synchronously
//! after a write commits; there is no reactive machinery behind this.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::database::Database;
use crate::types::errors::StoreError;

/// Which slice of the store a committed write touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    Collections,
    Tags,
    Bookmarks,
    Highlights,
    Settings,
}

pub type SubscriptionId = u64;

type Callback = Box<dyn Fn(ChangeEvent) + Send>;

#[derive(Default)]
struct Notifier {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriptionId, Callback>>,
}

#[derive(Clone)]
pub struct EntityStore {
    db: Arc<Mutex<Database>>,
    notifier: Arc<Notifier>,
}

impl EntityStore {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self {
            db,
            notifier: Arc::new(Notifier::default()),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Database>, StoreError> {
        self.db
            .lock()
            .map_err(|_| StoreError::DatabaseError("database lock poisoned".to_string()))
    }

    /// Removes every synced entity and the cursor, child tables first so the
    /// deletes never trip a foreign key. Credentials survive a clear.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let guard = self.lock()?;
        let conn = guard.connection();
        let tx = conn.unchecked_transaction()?;
        for table in [
            "highlight_tags",
            "bookmark_tags",
            "highlights",
            "bookmarks",
            "collections",
            "tags",
            "settings",
            "sync",
        ] {
            tx.execute(&format!("DELETE FROM {table}"), [])?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn subscribe(&self, callback: Callback) -> SubscriptionId {
        let id = self.notifier.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers().insert(id, callback);
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers().remove(&id).is_some()
    }

    pub fn notify(&self, event: ChangeEvent) {
        for callback in self.subscribers().values() {
            callback(event);
        }
    }

    // A panicking callback must not wedge every later notification, so a
    // poisoned registry lock is recovered rather than propagated.
    fn subscribers(&self) -> MutexGuard<'_, HashMap<SubscriptionId, Callback>> {
        self.notifier
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
