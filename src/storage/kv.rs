//! Durable key-value backends.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::{Error, Result};

/// A store of named string values.
///
/// Writes are synchronous: once `write` returns `Ok` the value survives a restart
/// (for durable backends).
pub trait KeyValueStore: Send + Sync {
  /// Read the raw value stored under `key`.
  fn read(&self, key: &str) -> Result<Option<String>>;

  /// Replace the value stored under `key`.
  fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Store that keeps values in memory only.
/// Used by tests and when no durable location is available.
#[derive(Default)]
pub struct MemoryStore {
  values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn values(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
    self
      .values
      .lock()
      .map_err(|e| Error::Storage(format!("Lock poisoned: {}", e)))
  }
}

impl KeyValueStore for MemoryStore {
  fn read(&self, key: &str) -> Result<Option<String>> {
    Ok(self.values()?.get(key).cloned())
  }

  fn write(&self, key: &str, value: &str) -> Result<()> {
    self.values()?.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

/// Schema for the key-value table.
const KV_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// SQLite-backed store, one row per key.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open or create the store at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| Error::Storage(format!("Failed to create storage directory: {}", e)))?;
    }

    let conn = Connection::open(path).map_err(|e| {
      Error::Storage(format!(
        "Failed to open storage at {}: {}",
        path.display(),
        e
      ))
    })?;
    debug!(path = %path.display(), "opened key-value store");

    Self::with_connection(conn)
  }

  /// Store that lives only as long as the process.
  pub fn in_memory() -> Result<Self> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(KV_SCHEMA)
      .map_err(|e| Error::Storage(format!("Failed to run storage migrations: {}", e)))?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
    self
      .conn
      .lock()
      .map_err(|e| Error::Storage(format!("Lock poisoned: {}", e)))
  }
}

impl KeyValueStore for SqliteStore {
  fn read(&self, key: &str) -> Result<Option<String>> {
    let conn = self.conn()?;
    let value = conn
      .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
        row.get(0)
      })
      .optional()?;
    Ok(value)
  }

  fn write(&self, key: &str, value: &str) -> Result<()> {
    let conn = self.conn()?;
    conn
      .execute(
        "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?, ?, ?)",
        params![key, value, Utc::now().to_rfc3339()],
      )
      .map_err(|e| Error::Storage(format!("Failed to write '{}': {}", key, e)))?;
    Ok(())
  }
}
