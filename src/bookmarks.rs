//! Bookmarked jobs, persisted across restarts.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use crate::api::{JobDetail, JobId};
use crate::cache::Batch;
use crate::error::Result;
use crate::queries::JobQueries;
use crate::storage::{KeyValueStore, Persisted};

/// Storage slot holding the bookmarked ids as a JSON list.
pub const BOOKMARKS_KEY: &str = "bookmarkedJobItemIds";

/// Set of bookmarked job ids, written through to durable storage on every change.
///
/// The set is kept sorted, so adding and then removing an id (or the other way
/// round) restores the exact stored serialization.
pub struct Bookmarks {
  ids: Persisted<BTreeSet<JobId>>,
  queries: JobQueries,
}

impl Bookmarks {
  /// Load the bookmarked ids from `store`.
  pub fn load(store: Arc<dyn KeyValueStore>, queries: JobQueries) -> Self {
    let ids = Persisted::load(store, BOOKMARKS_KEY, BTreeSet::new());
    info!(count = ids.get().len(), "bookmarks loaded");
    Self { ids, queries }
  }

  pub fn ids(&self) -> Vec<JobId> {
    self.ids.get().iter().copied().collect()
  }

  pub fn contains(&self, id: JobId) -> bool {
    self.ids.get().contains(&id)
  }

  pub fn len(&self) -> usize {
    self.ids.get().len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.get().is_empty()
  }

  /// Add `id`, returning false if it was already bookmarked.
  pub fn add(&mut self, id: JobId) -> Result<bool> {
    if self.contains(id) {
      return Ok(false);
    }
    self.ids.update(|ids| ids.insert(id))
  }

  /// Remove `id`, returning false if it was not bookmarked.
  pub fn remove(&mut self, id: JobId) -> Result<bool> {
    if !self.contains(id) {
      return Ok(false);
    }
    self.ids.update(|ids| ids.remove(&id))
  }

  /// Flip membership of `id`, returning whether it is now bookmarked.
  pub fn toggle(&mut self, id: JobId) -> Result<bool> {
    if self.contains(id) {
      self.remove(id)?;
      Ok(false)
    } else {
      self.add(id)?;
      Ok(true)
    }
  }

  /// Details for every bookmarked job, resolved through the request cache.
  pub fn bookmarked_job_items(&self) -> Batch<JobDetail> {
    self.queries.job_items_by_id(&self.ids())
  }
}
