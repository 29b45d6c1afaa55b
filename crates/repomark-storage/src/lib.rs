// Durable key-value storage for repomark
// Think browser localStorage, but in a SQLite file

pub mod error;
pub mod memory;
pub mod sqlite;

pub use error::{Result, StorageError};
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// A string-keyed, string-valued durable store
///
/// Mirrors the tiny surface of browser `localStorage`: read a slot,
/// overwrite a slot, drop a slot. Whoever holds a key owns it; there is
/// no locking across processes, last writer wins.
pub trait LocalStorage: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}
