//! Snapshot types handed out by the request cache.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::keys::QueryKey;
use crate::error::Error;

/// Default time before cached data is refetched.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(60 * 60);

/// Default time a failed entry is held before a `get` requests it again.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Lifecycle of a cache entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryStatus {
  /// Nothing fetched yet, or fetching is disabled
  #[default]
  Idle,
  /// A fetch is in flight
  Loading,
  /// Data present
  Success,
  /// The last fetch failed
  Error,
}

/// Per-call options for [`QueryClient::get`](super::QueryClient::get).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
  /// How long fetched data is reused before a `get` refetches it
  pub stale_time: Duration,
  /// How long a failure is reported as-is before a `get` retries it
  pub retry_delay: Duration,
  /// When false, `get` never starts a fetch
  pub enabled: bool,
}

impl Default for QueryOptions {
  fn default() -> Self {
    Self {
      stale_time: DEFAULT_STALE_TIME,
      retry_delay: DEFAULT_RETRY_DELAY,
      enabled: true,
    }
  }
}

impl QueryOptions {
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
    self.retry_delay = retry_delay;
    self
  }

  pub fn enabled(mut self, enabled: bool) -> Self {
    self.enabled = enabled;
    self
  }
}

/// Point-in-time copy of one cache entry.
///
/// `status == Success` exactly when `data` and `fetched_at` are present, and
/// `status == Error` exactly when `error` is present.
#[derive(Debug)]
pub struct CacheEntry<T> {
  pub key: QueryKey,
  pub data: Option<Arc<T>>,
  pub status: QueryStatus,
  pub fetched_at: Option<Instant>,
  pub error: Option<Error>,
}

impl<T> CacheEntry<T> {
  pub fn idle(key: QueryKey) -> Self {
    Self {
      key,
      data: None,
      status: QueryStatus::Idle,
      fetched_at: None,
      error: None,
    }
  }

  pub fn data(&self) -> Option<&T> {
    self.data.as_deref()
  }

  pub fn is_loading(&self) -> bool {
    self.status == QueryStatus::Loading
  }

  pub fn is_success(&self) -> bool {
    self.status == QueryStatus::Success
  }

  pub fn is_error(&self) -> bool {
    self.status == QueryStatus::Error
  }
}

impl<T> Clone for CacheEntry<T> {
  fn clone(&self) -> Self {
    Self {
      key: self.key.clone(),
      data: self.data.clone(),
      status: self.status,
      fetched_at: self.fetched_at,
      error: self.error.clone(),
    }
  }
}

/// Aggregate over several keys read together.
#[derive(Debug)]
pub struct Batch<T> {
  /// Resolved data in key order; keys without data are skipped
  pub items: Vec<Arc<T>>,
  /// True while any of the keys is loading
  pub is_loading: bool,
}

impl<T> Batch<T> {
  pub fn from_entries(entries: impl IntoIterator<Item = CacheEntry<T>>) -> Self {
    let mut items = Vec::new();
    let mut is_loading = false;
    for entry in entries {
      is_loading |= entry.is_loading();
      if let Some(data) = entry.data {
        items.push(data);
      }
    }
    Self { items, is_loading }
  }
}

impl<T> Default for Batch<T> {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      is_loading: false,
    }
  }
}
