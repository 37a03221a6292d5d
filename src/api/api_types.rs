//! Serde-deserializable types matching the jobs API responses.
//!
//! The envelopes are kept apart from the domain types so the rest of the
//! crate only ever sees `JobSummary` / `JobDetail`.

use serde::Deserialize;

use super::types::{JobDetail, JobSummary};

/// `GET {base}?search=..`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiJobItemsResponse {
  #[serde(default)]
  pub public: bool,
  #[serde(default)]
  pub sorted: bool,
  #[serde(default)]
  pub job_items: Vec<JobSummary>,
}

/// `GET {base}/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiJobItemResponse {
  #[serde(default)]
  pub public: bool,
  pub job_item: JobDetail,
}

/// Body of any non-2xx response
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
  pub description: String,
}
