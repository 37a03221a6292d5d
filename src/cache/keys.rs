use std::fmt;

use crate::api::JobId;

/// Identifies one logical query in the request cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
  /// Search job postings by text
  JobItems { search: String },
  /// Get a single job posting by id
  JobItem { id: JobId },
}

impl QueryKey {
  pub fn job_items(search: impl Into<String>) -> Self {
    Self::JobItems {
      search: search.into(),
    }
  }

  pub fn job_item(id: JobId) -> Self {
    Self::JobItem { id }
  }

  /// Human-readable description for logs and notifications.
  pub fn description(&self) -> String {
    match self {
      Self::JobItems { search } => format!("job search \"{}\"", search),
      Self::JobItem { id } => format!("job {}", id),
    }
  }
}

impl fmt::Display for QueryKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::JobItems { search } => write!(f, "list:{:?}", search),
      Self::JobItem { id } => write!(f, "detail:{}", id),
    }
  }
}
