use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::kv::KeyValueStore;
use crate::error::{Error, Result};

/// A single JSON-encoded value kept in a [`KeyValueStore`] slot.
///
/// The value is read once on [`Persisted::load`]; every change is written
/// through before the in-memory copy is replaced.
pub struct Persisted<T> {
  store: Arc<dyn KeyValueStore>,
  key: String,
  value: T,
}

impl<T: Serialize + DeserializeOwned + Clone> Persisted<T> {
  /// Load `key`, falling back to `default` when it is absent or unreadable.
  pub fn load(store: Arc<dyn KeyValueStore>, key: &str, default: T) -> Self {
    let value = match store.read(key) {
      Ok(Some(raw)) => match decode(key, &raw) {
        Ok(value) => value,
        Err(e) => {
          warn!(key, error = %e, "using default for unreadable stored value");
          default
        }
      },
      Ok(None) => {
        debug!(key, "no stored value, using default");
        default
      }
      Err(e) => {
        warn!(key, error = %e, "failed to read stored value, using default");
        default
      }
    };

    Self {
      store,
      key: key.to_string(),
      value,
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn get(&self) -> &T {
    &self.value
  }

  /// Persist `value`, then make it current.
  ///
  /// On error the previous value stays current.
  pub fn set(&mut self, value: T) -> Result<()> {
    let raw = serde_json::to_string(&value).map_err(|e| Error::Parse {
      key: self.key.clone(),
      message: e.to_string(),
    })?;
    self.store.write(&self.key, &raw)?;
    self.value = value;
    Ok(())
  }

  /// Apply `f` to a copy of the value and persist the result.
  pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
    let mut next = self.value.clone();
    let out = f(&mut next);
    self.set(next)?;
    Ok(out)
  }
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
  serde_json::from_str(raw).map_err(|e| Error::Parse {
    key: key.to_string(),
    message: e.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::MemoryStore;

  struct FailingStore;

  impl KeyValueStore for FailingStore {
    fn read(&self, _key: &str) -> Result<Option<String>> {
      Err(Error::Storage("disk gone".to_string()))
    }

    fn write(&self, _key: &str, _value: &str) -> Result<()> {
      Err(Error::Storage("disk gone".to_string()))
    }
  }

  #[test]
  fn test_load_falls_back_to_default() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let value = Persisted::load(store, "ids", vec![1u64]);
    assert_eq!(value.get(), &vec![1]);
  }

  #[test]
  fn test_load_ignores_malformed_value() {
    let store = Arc::new(MemoryStore::new());
    store.write("ids", "[1, 2,").unwrap();

    let value = Persisted::load(store, "ids", Vec::<u64>::new());
    assert!(value.get().is_empty());
  }

  #[test]
  fn test_writes_are_visible_to_next_load() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

    let mut value = Persisted::load(Arc::clone(&store), "ids", Vec::<u64>::new());
    value.set(vec![3, 4]).unwrap();
    let len = value.update(|ids| {
      ids.push(5);
      ids.len()
    });
    assert_eq!(len.unwrap(), 3);

    assert_eq!(store.read("ids").unwrap().as_deref(), Some("[3,4,5]"));
    let reloaded = Persisted::load(store, "ids", Vec::<u64>::new());
    assert_eq!(reloaded.get(), &vec![3, 4, 5]);
  }

  #[test]
  fn test_failed_write_keeps_previous_value() {
    let mut value = Persisted::load(Arc::new(FailingStore), "ids", vec![1u64]);
    assert!(value.set(vec![2]).is_err());
    assert_eq!(value.get(), &vec![1]);
  }
}
