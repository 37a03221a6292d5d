//! Search, sort and pagination over cached search results.

use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use crate::api::{JobSummary, PageDirection, SortBy};
use crate::cache::QueryKey;
use crate::debounce::Debouncer;
use crate::queries::JobQueries;

/// Results per page.
pub const DEFAULT_PAGE_SIZE: usize = 7;

/// Sort a copy of `items`; ties keep their fetched order.
pub fn sort_job_items<'a>(items: &'a [JobSummary], sort_by: SortBy) -> Vec<&'a JobSummary> {
  let mut sorted: Vec<&JobSummary> = items.iter().collect();
  match sort_by {
    SortBy::Relevant => sorted.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score)),
    SortBy::Recent => sorted.sort_by(|a, b| a.days_ago.cmp(&b.days_ago)),
  }
  sorted
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
  if page_size == 0 {
    return 0;
  }
  total.div_ceil(page_size)
}

/// Items on 1-based `page`; empty when the page is out of range.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
  let start = page.saturating_sub(1).saturating_mul(page_size).min(items.len());
  let end = start.saturating_add(page_size).min(items.len());
  &items[start..end]
}

/// View state owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
  pub raw_text: String,
  pub debounced_text: String,
  pub sort_by: SortBy,
  pub current_page: usize,
}

impl Default for SearchState {
  fn default() -> Self {
    Self {
      raw_text: String::new(),
      debounced_text: String::new(),
      sort_by: SortBy::default(),
      current_page: 1,
    }
  }
}

/// Ready-to-render search results.
#[derive(Debug, Clone, PartialEq)]
pub struct JobItemsView {
  pub job_items_sorted_and_sliced: Vec<JobSummary>,
  pub is_loading: bool,
  pub total_number_of_results: usize,
  pub total_number_of_pages: usize,
  pub current_page: usize,
  pub sort_by: SortBy,
  pub error: Option<String>,
}

/// Couples debounced search text with the list query, then sorts and pages the
/// cached result set.
///
/// The controller holds no result data: every read goes back to the request
/// cache, so dropping it leaves nothing behind to update.
pub struct JobItemsController {
  queries: JobQueries,
  debouncer: Debouncer<String>,
  state: SearchState,
  page_size: usize,
}

impl JobItemsController {
  /// Must be called from within a tokio runtime.
  pub fn new(queries: JobQueries, debounce: Duration, page_size: usize) -> Self {
    Self {
      queries,
      debouncer: Debouncer::new(String::new(), debounce),
      state: SearchState::default(),
      page_size: page_size.max(1),
    }
  }

  pub fn state(&self) -> &SearchState {
    &self.state
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  /// Receiver that changes whenever typed text settles.
  pub fn settled_search(&self) -> watch::Receiver<String> {
    self.debouncer.subscribe()
  }

  /// Feed raw search text; the list query follows once it settles.
  pub fn set_search_text(&mut self, text: impl Into<String>) {
    let text = text.into();
    self.state.raw_text.clone_from(&text);
    self.debouncer.set(text);
  }

  /// Pick up settled search text, returning whether it changed.
  pub fn sync(&mut self) -> bool {
    let settled = self.debouncer.value();
    if settled == self.state.debounced_text {
      return false;
    }
    debug!(search = %settled, "search text settled");
    self.state.debounced_text = settled;
    self.state.current_page = 1;
    true
  }

  pub fn handle_change_sort_by(&mut self, sort_by: SortBy) {
    self.state.sort_by = sort_by;
    self.state.current_page = 1;
  }

  /// Move one page; requests past either end are ignored.
  pub fn handle_change_page(&mut self, direction: PageDirection) {
    let total_pages = total_pages(self.total_number_of_results(), self.page_size);
    match direction {
      PageDirection::Next if self.state.current_page < total_pages => {
        self.state.current_page += 1;
      }
      PageDirection::Previous if self.state.current_page > 1 => {
        self.state.current_page -= 1;
      }
      _ => {}
    }
  }

  /// Current page of results, fetching the list if needed.
  pub fn view(&mut self) -> JobItemsView {
    self.sync();
    let entry = self.queries.job_items(&self.state.debounced_text);
    let items = entry.data().map(Vec::as_slice).unwrap_or_default();

    let sorted = sort_job_items(items, self.state.sort_by);
    let job_items_sorted_and_sliced = page_slice(&sorted, self.state.current_page, self.page_size)
      .iter()
      .map(|item| (*item).clone())
      .collect();

    JobItemsView {
      job_items_sorted_and_sliced,
      is_loading: entry.is_loading(),
      total_number_of_results: items.len(),
      total_number_of_pages: total_pages(items.len(), self.page_size),
      current_page: self.state.current_page,
      sort_by: self.state.sort_by,
      error: entry.error.as_ref().map(|e| e.to_string()),
    }
  }

  /// Refetch the current search if it failed; cached results are kept.
  pub fn retry(&self) {
    if self.state.debounced_text.is_empty() {
      return;
    }
    let key = QueryKey::job_items(self.state.debounced_text.as_str());
    if self.queries.client().peek::<Vec<JobSummary>>(&key).is_error() {
      self.queries.client().invalidate(&key);
    }
  }

  fn total_number_of_results(&self) -> usize {
    self
      .queries
      .job_items(&self.state.debounced_text)
      .data()
      .map(Vec::len)
      .unwrap_or(0)
  }
}
