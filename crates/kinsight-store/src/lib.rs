//! SQLite persistence for conversations and derived insights

mod sqlite;

pub use sqlite::SqliteStore;
