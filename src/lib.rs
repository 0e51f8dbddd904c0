//! LinkVault — local-first sync core for bookmarks, highlights, and notes.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod api;
pub mod database;
pub mod repos;
pub mod services;
pub mod sync;
pub mod types;
