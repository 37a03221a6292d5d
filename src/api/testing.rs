//! Scriptable in-process `JobSource` for tests.

use futures::future::{BoxFuture, FutureExt};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::client::JobSource;
use super::types::{JobDetail, JobId, JobSummary};
use crate::error::{Error, Result};

pub fn summary(id: JobId, relevance_score: f64, days_ago: u32) -> JobSummary {
  JobSummary {
    id,
    badge_letters: "JS".to_string(),
    title: format!("Job {}", id),
    company: "Acme".to_string(),
    date: format!("{}d", days_ago),
    relevance_score,
    days_ago,
  }
}

pub fn detail(id: JobId, title: &str) -> JobDetail {
  JobDetail {
    summary: JobSummary {
      title: title.to_string(),
      ..summary(id, 0.5, 1)
    },
    description: String::new(),
    qualifications: Vec::new(),
    reviews: Vec::new(),
    duration: "Full-Time".to_string(),
    location: "Remote".to_string(),
    salary: "$100,000+".to_string(),
    cover_img_url: String::new(),
    company_url: String::new(),
  }
}

#[derive(Default)]
struct FakeState {
  items: Mutex<Vec<JobSummary>>,
  delays: Mutex<VecDeque<Duration>>,
  default_delay: Mutex<Duration>,
  failing_ids: Mutex<HashSet<JobId>>,
  search_error: Mutex<Option<String>>,
  searches: Mutex<Vec<String>>,
  search_calls: AtomicUsize,
  detail_calls: AtomicUsize,
}

/// Counts every call at the moment the request is issued.
///
/// Detail titles carry the call number (`"Job 7 #2"`) so tests can tell which
/// response ended up in the cache.
#[derive(Clone, Default)]
pub struct FakeJobSource {
  state: Arc<FakeState>,
}

impl FakeJobSource {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_items(items: Vec<JobSummary>) -> Self {
    let source = Self::new();
    *source.state.items.lock().unwrap() = items;
    source
  }

  pub fn with_delay(self, delay: Duration) -> Self {
    *self.state.default_delay.lock().unwrap() = delay;
    self
  }

  /// Delay for the next request only; queued delays are consumed in order.
  pub fn push_delay(&self, delay: Duration) {
    self.state.delays.lock().unwrap().push_back(delay);
  }

  pub fn fail_job_item(&self, id: JobId) {
    self.state.failing_ids.lock().unwrap().insert(id);
  }

  pub fn fail_search(&self, message: &str) {
    *self.state.search_error.lock().unwrap() = Some(message.to_string());
  }

  pub fn search_calls(&self) -> usize {
    self.state.search_calls.load(Ordering::SeqCst)
  }

  pub fn detail_calls(&self) -> usize {
    self.state.detail_calls.load(Ordering::SeqCst)
  }

  pub fn searches(&self) -> Vec<String> {
    self.state.searches.lock().unwrap().clone()
  }

  fn next_delay(&self) -> Duration {
    self
      .state
      .delays
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or(*self.state.default_delay.lock().unwrap())
  }
}

impl JobSource for FakeJobSource {
  fn search_job_items(&self, search: &str) -> BoxFuture<'static, Result<Vec<JobSummary>>> {
    self.state.search_calls.fetch_add(1, Ordering::SeqCst);
    self.state.searches.lock().unwrap().push(search.to_string());

    let delay = self.next_delay();
    let error = self.state.search_error.lock().unwrap().clone();
    let items = self.state.items.lock().unwrap().clone();

    async move {
      tokio::time::sleep(delay).await;
      match error {
        Some(message) => Err(Error::Network(message)),
        None => Ok(items),
      }
    }
    .boxed()
  }

  fn job_item(&self, id: JobId) -> BoxFuture<'static, Result<JobDetail>> {
    let call = self.state.detail_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let delay = self.next_delay();
    let fails = self.state.failing_ids.lock().unwrap().contains(&id);

    async move {
      tokio::time::sleep(delay).await;
      if fails {
        Err(Error::Network(format!("Job {} not found", id)))
      } else {
        Ok(detail(id, &format!("Job {} #{}", id, call)))
      }
    }
    .boxed()
  }
}
