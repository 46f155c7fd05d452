//! Fyle Store: SQLite persistence for categories and documents.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteStore;
pub use types::*;
