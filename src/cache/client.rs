//! Process-wide request cache.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::entry::{Batch, CacheEntry, QueryOptions, QueryStatus};
use super::keys::QueryKey;
use crate::error::{Error, Result};

type AnyData = Arc<dyn Any + Send + Sync>;

/// Side effect invoked once for every fetch that settles with an error.
pub type ErrorHook = Arc<dyn Fn(&QueryKey, &Error) + Send + Sync>;

/// Table row owned by the cache. Only `get`, `invalidate` and the settling task write it.
struct Slot {
  data: Option<AnyData>,
  status: QueryStatus,
  fetched_at: Option<Instant>,
  error: Option<Error>,
  errored_at: Option<Instant>,
  /// Last time the row was created, started loading or settled
  touched_at: Instant,
  /// Bumped for every fetch started; a response is applied only if it still matches.
  generation: u64,
  task: Option<JoinHandle<()>>,
}

impl Slot {
  fn new() -> Self {
    Self {
      data: None,
      status: QueryStatus::Idle,
      fetched_at: None,
      error: None,
      errored_at: None,
      touched_at: Instant::now(),
      generation: 0,
      task: None,
    }
  }

  fn needs_fetch(&self, options: &QueryOptions) -> bool {
    let older_than = |at: Option<Instant>, age: Duration| at.map_or(true, |t| t.elapsed() > age);
    match self.status {
      QueryStatus::Idle => true,
      QueryStatus::Success => older_than(self.fetched_at, options.stale_time),
      // Redraws within the retry delay keep the error instead of hammering the source
      QueryStatus::Error => older_than(self.errored_at, options.retry_delay),
      QueryStatus::Loading => false,
    }
  }

  /// Idle or settled and untouched for longer than `max_age`.
  fn is_evictable(&self, max_age: Duration) -> bool {
    self.status != QueryStatus::Loading && self.touched_at.elapsed() > max_age
  }

  /// Mark the row loading under a new generation and return it.
  fn begin_fetch(&mut self, key: &QueryKey) -> u64 {
    self.generation += 1;
    self.data = None;
    self.status = QueryStatus::Loading;
    self.fetched_at = None;
    self.error = None;
    self.errored_at = None;
    self.touched_at = Instant::now();
    self.task = None;
    info!(key = %key, generation = self.generation, "starting fetch");
    self.generation
  }

  fn snapshot<T: Send + Sync + 'static>(&self, key: &QueryKey) -> CacheEntry<T> {
    let data = self.data.clone().and_then(|d| match d.downcast::<T>() {
      Ok(data) => Some(data),
      Err(_) => {
        warn!(key = %key, "cached data has an unexpected type");
        None
      }
    });

    CacheEntry {
      key: key.clone(),
      data,
      status: self.status,
      fetched_at: self.fetched_at,
      error: self.error.clone(),
    }
  }
}

struct Shared {
  table: Mutex<HashMap<QueryKey, Slot>>,
  on_error: RwLock<Option<ErrorHook>>,
  version: watch::Sender<u64>,
}

impl Shared {
  fn table(&self) -> MutexGuard<'_, HashMap<QueryKey, Slot>> {
    self.table.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn notify(&self) {
    self.version.send_modify(|v| *v = v.wrapping_add(1));
  }

  /// Apply a finished fetch if it is still the latest one registered for `key`.
  fn settle(&self, key: &QueryKey, generation: u64, result: Result<AnyData>) {
    let failure = {
      let mut table = self.table();
      let Some(slot) = table.get_mut(key) else {
        debug!(key = %key, "entry dropped before response arrived");
        return;
      };
      if slot.generation != generation {
        debug!(
          key = %key,
          generation,
          latest = slot.generation,
          "discarding superseded response"
        );
        return;
      }

      let now = Instant::now();
      slot.task = None;
      slot.touched_at = now;
      match result {
        Ok(data) => {
          info!(key = %key, "fetch succeeded");
          slot.data = Some(data);
          slot.status = QueryStatus::Success;
          slot.fetched_at = Some(now);
          slot.error = None;
          slot.errored_at = None;
          None
        }
        Err(e) => {
          warn!(key = %key, error = %e, "fetch failed");
          slot.data = None;
          slot.status = QueryStatus::Error;
          slot.fetched_at = None;
          slot.error = Some(e.clone());
          slot.errored_at = Some(now);
          Some(e)
        }
      }
    };

    if let Some(e) = failure {
      let hook = self
        .on_error
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
      if let Some(hook) = hook {
        hook(key, &e);
      }
    }

    self.notify();
  }
}

/// Keyed, deduplicating, stale-time aware cache around asynchronous fetches.
///
/// One `QueryClient` is constructed at startup and cloned into every consumer;
/// clones share the same table. Reads never fail: errors are captured into the
/// entry and reported through the hook set with [`QueryClient::on_error`].
///
/// Fetches are spawned onto the current tokio runtime, so `get` must be called
/// from within one.
#[derive(Clone)]
pub struct QueryClient {
  shared: Arc<Shared>,
}

impl Default for QueryClient {
  fn default() -> Self {
    Self::new()
  }
}

impl QueryClient {
  pub fn new() -> Self {
    let (version, _) = watch::channel(0);
    Self {
      shared: Arc::new(Shared {
        table: Mutex::new(HashMap::new()),
        on_error: RwLock::new(None),
        version,
      }),
    }
  }

  /// Register the side effect run for each failed fetch, replacing any previous one.
  pub fn on_error(&self, hook: impl Fn(&QueryKey, &Error) + Send + Sync + 'static) {
    *self
      .shared
      .on_error
      .write()
      .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(hook));
  }

  /// Receiver that changes whenever an entry starts loading or settles.
  pub fn subscribe(&self) -> watch::Receiver<u64> {
    self.shared.version.subscribe()
  }

  /// Read `key`, starting a fetch when the entry is missing or stale, or when
  /// it failed longer than `retry_delay` ago.
  ///
  /// While a fetch for `key` is in flight every caller attaches to it, so
  /// `fetcher` is invoked at most once per loading episode. Calling this
  /// repeatedly is cheap and never issues duplicate requests. `fetcher` runs
  /// outside the table lock and may read the client itself.
  pub fn get<T, F, Fut>(&self, key: &QueryKey, fetcher: F, options: &QueryOptions) -> CacheEntry<T>
  where
    T: Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
  {
    let (started, snapshot) = {
      let mut table = self.shared.table();
      if !table.contains_key(key) {
        evict(&mut table, options.stale_time);
      }
      let slot = table.entry(key.clone()).or_insert_with(Slot::new);

      let started = if options.enabled && slot.needs_fetch(options) {
        Some(slot.begin_fetch(key))
      } else {
        if slot.status == QueryStatus::Loading {
          debug!(key = %key, "attaching to in-flight fetch");
        }
        None
      };
      (started, slot.snapshot(key))
    };

    if let Some(generation) = started {
      self.spawn_fetch(key, generation, fetcher());
      self.shared.notify();
    }
    snapshot
  }

  /// Read several keys at once, see [`Batch`].
  pub fn get_many<T, F, Fut>(
    &self,
    keys: &[QueryKey],
    mut fetcher: F,
    options: &QueryOptions,
  ) -> Batch<T>
  where
    T: Send + Sync + 'static,
    F: FnMut(&QueryKey) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
  {
    Batch::from_entries(
      keys
        .iter()
        .map(|key| self.get(key, || fetcher(key), options))
        .collect::<Vec<_>>(),
    )
  }

  /// Read `key` without ever starting a fetch.
  pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> CacheEntry<T> {
    match self.shared.table().get(key) {
      Some(slot) => slot.snapshot(key),
      None => CacheEntry::idle(key.clone()),
    }
  }

  /// Reset `key` to idle so the next `get` fetches again.
  ///
  /// A fetch still in flight for `key` is detached: its response is discarded
  /// when it arrives.
  pub fn invalidate(&self, key: &QueryKey) {
    let changed = {
      let mut table = self.shared.table();
      match table.get_mut(key) {
        Some(slot) => {
          slot.generation += 1;
          slot.data = None;
          slot.status = QueryStatus::Idle;
          slot.fetched_at = None;
          slot.error = None;
          slot.errored_at = None;
          slot.touched_at = Instant::now();
          slot.task = None;
          true
        }
        None => false,
      }
    };

    if changed {
      debug!(key = %key, "invalidated");
      self.shared.notify();
    }
  }

  /// Abort every in-flight fetch and drop all entries.
  pub fn shutdown(&self) {
    let mut table = self.shared.table();
    for (key, slot) in table.iter_mut() {
      if let Some(task) = slot.task.take() {
        debug!(key = %key, "aborting in-flight fetch");
        task.abort();
      }
    }
    table.clear();
  }

  fn spawn_fetch<T, Fut>(&self, key: &QueryKey, generation: u64, future: Fut)
  where
    T: Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
  {
    let shared = Arc::clone(&self.shared);
    let task_key = key.clone();
    let task = tokio::spawn(async move {
      let result = future.await.map(|data| Arc::new(data) as AnyData);
      shared.settle(&task_key, generation, result);
    });

    // Keep the handle only while this fetch is still the one in flight
    let mut table = self.shared.table();
    if let Some(slot) = table.get_mut(key) {
      if slot.generation == generation && slot.status == QueryStatus::Loading {
        slot.task = Some(task);
      }
    }
  }
}

/// Drop rows nobody has touched for longer than `max_age`.
///
/// Stale data would be refetched on the next read anyway, so removing it only
/// bounds the table.
fn evict(table: &mut HashMap<QueryKey, Slot>, max_age: Duration) {
  let before = table.len();
  table.retain(|_, slot| !slot.is_evictable(max_age));
  let evicted = before - table.len();
  if evicted > 0 {
    debug!(evicted, remaining = table.len(), "evicted unused cache entries");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::FakeJobSource;
  use crate::api::{JobDetail, JobSource};
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn detail_entry(
    client: &QueryClient,
    source: &FakeJobSource,
    id: u64,
    options: &QueryOptions,
  ) -> CacheEntry<JobDetail> {
    client.get(&QueryKey::job_item(id), || source.job_item(id), options)
  }

  #[tokio::test(start_paused = true)]
  async fn test_concurrent_gets_share_one_fetch() {
    let client = QueryClient::new();
    let source = FakeJobSource::new().with_delay(Duration::from_millis(50));
    let options = QueryOptions::default();

    for _ in 0..5 {
      let entry = detail_entry(&client, &source, 7, &options);
      assert!(entry.is_loading());
      assert!(entry.data.is_none());
    }
    assert_eq!(source.detail_calls(), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;

    let entry = detail_entry(&client, &source, 7, &options);
    assert!(entry.is_success());
    assert!(entry.fetched_at.is_some());
    assert_eq!(entry.data().unwrap().summary.title, "Job 7 #1");
    assert_eq!(source.detail_calls(), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_gets_from_many_tasks_share_one_fetch() {
    let client = QueryClient::new();
    let source = FakeJobSource::new().with_delay(Duration::from_millis(50));

    let handles: Vec<_> = (0..8)
      .map(|_| {
        let client = client.clone();
        let source = source.clone();
        tokio::spawn(async move {
          detail_entry(&client, &source, 3, &QueryOptions::default()).status
        })
      })
      .collect();

    for status in futures::future::join_all(handles).await {
      assert_eq!(status.unwrap(), QueryStatus::Loading);
    }
    assert_eq!(source.detail_calls(), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_refetches_only_after_stale_time() {
    let client = QueryClient::new();
    let source = FakeJobSource::new();
    let options = QueryOptions::default().with_stale_time(Duration::from_secs(60));

    detail_entry(&client, &source, 1, &options);
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(detail_entry(&client, &source, 1, &options).is_success());

    tokio::time::sleep(Duration::from_secs(30)).await;
    let entry = detail_entry(&client, &source, 1, &options);
    assert!(entry.is_success());
    assert_eq!(source.detail_calls(), 1);

    tokio::time::sleep(Duration::from_secs(31)).await;
    let entry = detail_entry(&client, &source, 1, &options);
    assert!(entry.is_loading());
    assert_eq!(source.detail_calls(), 2);

    tokio::time::sleep(Duration::from_millis(1)).await;
    let entry = detail_entry(&client, &source, 1, &options);
    assert_eq!(entry.data().unwrap().summary.title, "Job 1 #2");
  }

  #[tokio::test(start_paused = true)]
  async fn test_disabled_query_stays_idle() {
    let client = QueryClient::new();
    let source = FakeJobSource::new();
    let options = QueryOptions::default().enabled(false);

    let entry = detail_entry(&client, &source, 1, &options);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(entry.status, QueryStatus::Idle);
    assert_eq!(detail_entry(&client, &source, 1, &options).status, QueryStatus::Idle);
    assert_eq!(source.detail_calls(), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn test_error_is_reported_once_and_held_until_invalidated() {
    let client = QueryClient::new();
    let reported = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reported);
    client.on_error(move |key, error| {
      assert_eq!(key, &QueryKey::job_item(9));
      assert_eq!(error, &Error::Network("Job 9 not found".to_string()));
      counter.fetch_add(1, Ordering::SeqCst);
    });

    let source = FakeJobSource::new();
    source.fail_job_item(9);
    let options = QueryOptions::default();

    detail_entry(&client, &source, 9, &options);
    tokio::time::sleep(Duration::from_millis(1)).await;

    for _ in 0..3 {
      let entry = detail_entry(&client, &source, 9, &options);
      assert!(entry.is_error());
      assert!(entry.data.is_none());
      assert!(entry.error.is_some());
    }
    assert_eq!(source.detail_calls(), 1);
    assert_eq!(reported.load(Ordering::SeqCst), 1);

    client.invalidate(&QueryKey::job_item(9));
    assert!(detail_entry(&client, &source, 9, &options).is_loading());
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(source.detail_calls(), 2);
    assert_eq!(reported.load(Ordering::SeqCst), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_failed_key_is_requested_again_after_retry_delay() {
    let client = QueryClient::new();
    let source = FakeJobSource::new();
    source.fail_job_item(9);
    let options = QueryOptions::default().with_retry_delay(Duration::from_secs(30));

    detail_entry(&client, &source, 9, &options);
    tokio::time::sleep(Duration::from_millis(1)).await;

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(detail_entry(&client, &source, 9, &options).is_error());
    assert_eq!(source.detail_calls(), 1);

    tokio::time::sleep(Duration::from_secs(5 * 60 * 60)).await;
    let entry = detail_entry(&client, &source, 9, &options);
    assert!(entry.is_loading());
    assert!(entry.error.is_none());
    assert_eq!(source.detail_calls(), 2);

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(detail_entry(&client, &source, 9, &options).is_error());
    assert_eq!(source.detail_calls(), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_fetcher_may_read_the_client() {
    let client = QueryClient::new();
    let source = FakeJobSource::new();
    let options = QueryOptions::default();
    let key = QueryKey::job_item(4);

    let entry: CacheEntry<JobDetail> = client.get(
      &key,
      || {
        let current: CacheEntry<JobDetail> = client.peek(&key);
        assert!(current.is_loading());
        source.job_item(4)
      },
      &options,
    );
    assert!(entry.is_loading());

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(client.peek::<JobDetail>(&key).is_success());
  }

  #[tokio::test(start_paused = true)]
  async fn test_untouched_entries_are_evicted_on_insert() {
    let client = QueryClient::new();
    let source = FakeJobSource::new();
    let options = QueryOptions::default().with_stale_time(Duration::from_secs(60));

    detail_entry(&client, &source, 1, &options);
    tokio::time::sleep(Duration::from_secs(30)).await;
    detail_entry(&client, &source, 2, &options);
    tokio::time::sleep(Duration::from_millis(1)).await;

    // Entry 1 is 30s old: still fresh, kept
    detail_entry(&client, &source, 3, &options);
    assert!(client.peek::<JobDetail>(&QueryKey::job_item(1)).is_success());

    tokio::time::sleep(Duration::from_secs(45)).await;
    detail_entry(&client, &source, 4, &options);

    // Entry 1 settled 75s ago and goes; 2 and 3 are younger than a minute
    let evicted = client.peek::<JobDetail>(&QueryKey::job_item(1));
    assert_eq!(evicted.status, QueryStatus::Idle);
    assert!(evicted.data.is_none());
    assert!(client.peek::<JobDetail>(&QueryKey::job_item(2)).is_success());
    assert!(client.peek::<JobDetail>(&QueryKey::job_item(3)).is_success());
  }

  #[tokio::test(start_paused = true)]
  async fn test_superseded_response_is_discarded() {
    let client = QueryClient::new();
    let source = FakeJobSource::new();
    let options = QueryOptions::default();
    let key = QueryKey::job_item(5);

    source.push_delay(Duration::from_millis(100));
    detail_entry(&client, &source, 5, &options);

    tokio::time::sleep(Duration::from_millis(10)).await;
    client.invalidate(&key);
    source.push_delay(Duration::from_millis(10));
    detail_entry(&client, &source, 5, &options);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let entry: CacheEntry<JobDetail> = client.peek(&key);
    assert_eq!(entry.data().unwrap().summary.title, "Job 5 #2");

    // First response lands now and must not clobber the newer one
    tokio::time::sleep(Duration::from_millis(100)).await;
    let entry: CacheEntry<JobDetail> = client.peek(&key);
    assert_eq!(entry.data().unwrap().summary.title, "Job 5 #2");
    assert_eq!(source.detail_calls(), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_get_many_aggregates_loading_and_filters_missing() {
    let client = QueryClient::new();
    let source = FakeJobSource::new().with_delay(Duration::from_millis(10));
    source.fail_job_item(2);
    let options = QueryOptions::default();
    let keys = vec![
      QueryKey::job_item(1),
      QueryKey::job_item(2),
      QueryKey::job_item(3),
    ];
    let fetch = |key: &QueryKey| match key {
      QueryKey::JobItem { id } => source.job_item(*id),
      QueryKey::JobItems { .. } => unreachable!(),
    };

    let batch: Batch<JobDetail> = client.get_many(&keys, fetch, &options);
    assert!(batch.is_loading);
    assert!(batch.items.is_empty());

    tokio::time::sleep(Duration::from_millis(20)).await;

    let batch: Batch<JobDetail> = client.get_many(&keys, fetch, &options);
    assert!(!batch.is_loading);
    let ids: Vec<_> = batch.items.iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(source.detail_calls(), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn test_subscribe_wakes_on_settle() {
    let client = QueryClient::new();
    let source = FakeJobSource::new().with_delay(Duration::from_millis(10));
    let mut changes = client.subscribe();

    detail_entry(&client, &source, 1, &QueryOptions::default());
    changes.borrow_and_update();

    changes.changed().await.unwrap();
    let entry: CacheEntry<JobDetail> = client.peek(&QueryKey::job_item(1));
    assert!(entry.is_success());
  }

  #[tokio::test(start_paused = true)]
  async fn test_shutdown_aborts_in_flight_fetches() {
    let client = QueryClient::new();
    let source = FakeJobSource::new().with_delay(Duration::from_millis(50));

    detail_entry(&client, &source, 1, &QueryOptions::default());
    client.shutdown();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let entry: CacheEntry<JobDetail> = client.peek(&QueryKey::job_item(1));
    assert_eq!(entry.status, QueryStatus::Idle);
  }
}
