//! Persisted key-value storage.

mod kv;
mod persisted;

pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use persisted::Persisted;
