//! The two job queries bound to the request cache.

use futures::future::{self, FutureExt};
use std::sync::Arc;

use crate::api::{JobDetail, JobId, JobSource, JobSummary};
use crate::cache::{Batch, CacheEntry, QueryClient, QueryKey, QueryOptions};
use crate::error::Error;

/// Cache-backed access to the jobs API.
///
/// Every read goes through the shared [`QueryClient`], so list and detail
/// results are deduplicated and reused across all consumers.
#[derive(Clone)]
pub struct JobQueries {
  client: QueryClient,
  source: Arc<dyn JobSource>,
  options: QueryOptions,
}

impl JobQueries {
  pub fn new(client: QueryClient, source: Arc<dyn JobSource>, options: QueryOptions) -> Self {
    Self {
      client,
      source,
      options,
    }
  }

  pub fn client(&self) -> &QueryClient {
    &self.client
  }

  /// Search results for `search`. Nothing is fetched for empty text.
  pub fn job_items(&self, search: &str) -> CacheEntry<Vec<JobSummary>> {
    let options = self.options.enabled(!search.is_empty());
    self.client.get(
      &QueryKey::job_items(search),
      || self.source.search_job_items(search),
      &options,
    )
  }

  /// Details for a single job. Id 0 is never fetched.
  pub fn job_item(&self, id: JobId) -> CacheEntry<JobDetail> {
    let options = self.options.enabled(id != 0);
    self.client.get(
      &QueryKey::job_item(id),
      || self.source.job_item(id),
      &options,
    )
  }

  /// Details for several jobs, skipping the ones not resolved yet and id 0.
  pub fn job_items_by_id(&self, ids: &[JobId]) -> Batch<JobDetail> {
    let keys: Vec<QueryKey> = ids
      .iter()
      .filter(|id| **id != 0)
      .map(|id| QueryKey::job_item(*id))
      .collect();
    self.client.get_many(
      &keys,
      |key| match key {
        QueryKey::JobItem { id } => self.source.job_item(*id),
        QueryKey::JobItems { .. } => {
          future::ready(Err(Error::Network(format!("{} is not a detail query", key)))).boxed()
        }
      },
      &self.options,
    )
  }

  /// Request again every job in `ids` whose detail fetch failed.
  pub fn retry_failed_job_items(&self, ids: &[JobId]) {
    for id in ids {
      let key = QueryKey::job_item(*id);
      if self.client.peek::<JobDetail>(&key).is_error() {
        self.client.invalidate(&key);
      }
    }
  }
}
