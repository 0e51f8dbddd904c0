//! Entity repositories. Each repo borrows a live connection and owns the SQL
//! for one table family; `EntityStore` is the shared handle callers clone.

pub mod bookmark_repo;
pub mod collection_repo;
pub mod cursor_repo;
pub mod highlight_repo;
pub mod settings_repo;
pub mod store;
pub mod tag_repo;

pub use bookmark_repo::BookmarkRepo;
pub use collection_repo::CollectionRepo;
pub use cursor_repo::CursorRepo;
pub use highlight_repo::HighlightRepo;
pub use settings_repo::SettingsRepo;
pub use store::{ChangeEvent, EntityStore, SubscriptionId};
pub use tag_repo::TagRepo;
