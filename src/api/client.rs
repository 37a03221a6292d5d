use futures::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::api_types::{ApiErrorResponse, ApiJobItemResponse, ApiJobItemsResponse};
use super::types::{JobDetail, JobId, JobSummary};
use crate::error::{Error, Result};

/// Anything that can answer the two job queries.
///
/// Futures are `'static` so the request cache can drive them from a spawned task
/// after the caller has moved on.
pub trait JobSource: Send + Sync {
  fn search_job_items(&self, search: &str) -> BoxFuture<'static, Result<Vec<JobSummary>>>;

  fn job_item(&self, id: JobId) -> BoxFuture<'static, Result<JobDetail>>;
}

/// HTTP client for the jobs API
#[derive(Clone)]
pub struct JobsClient {
  http: reqwest::Client,
  base_url: Url,
}

impl JobsClient {
  pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
    let http = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { http, base_url })
  }

  /// `{base}?search={text}`
  pub fn search_url(&self, search: &str) -> Url {
    let mut url = self.base_url.clone();
    url.query_pairs_mut().clear().append_pair("search", search);
    url
  }

  /// `{base}/{id}`
  pub fn detail_url(&self, id: JobId) -> Url {
    let mut url = self.base_url.clone();
    let path = format!("{}/{}", url.path().trim_end_matches('/'), id);
    url.set_path(&path);
    url.set_query(None);
    url
  }

  /// Search job postings
  pub async fn search(&self, search: &str) -> Result<Vec<JobSummary>> {
    info!(search, "searching job items");
    let response: ApiJobItemsResponse = self.get_json(self.search_url(search)).await?;
    debug!(
      search,
      count = response.job_items.len(),
      sorted = response.sorted,
      "job items received"
    );
    Ok(response.job_items)
  }

  /// Get a single job posting by id
  pub async fn get_job_item(&self, id: JobId) -> Result<JobDetail> {
    info!(id, "fetching job item");
    let response: ApiJobItemResponse = self.get_json(self.detail_url(id)).await?;
    Ok(response.job_item)
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
    let response = self.http.get(url.clone()).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(Error::Network(error_message(status, &body)));
    }

    serde_json::from_str(&body)
      .map_err(|e| Error::Network(format!("Invalid response from {}: {}", url, e)))
  }
}

impl JobSource for JobsClient {
  fn search_job_items(&self, search: &str) -> BoxFuture<'static, Result<Vec<JobSummary>>> {
    let client = self.clone();
    let search = search.to_string();
    async move { client.search(&search).await }.boxed()
  }

  fn job_item(&self, id: JobId) -> BoxFuture<'static, Result<JobDetail>> {
    let client = self.clone();
    async move { client.get_job_item(id).await }.boxed()
  }
}

/// Non-2xx bodies carry `{description}`; anything else falls back to the status line.
fn error_message(status: StatusCode, body: &str) -> String {
  serde_json::from_str::<ApiErrorResponse>(body)
    .map(|e| e.description)
    .unwrap_or_else(|_| format!("Request failed with status {}", status))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base: &str) -> JobsClient {
    JobsClient::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
  }

  #[test]
  fn test_search_url_encodes_text() {
    let c = client("https://api.example.com/jobs/data");
    assert_eq!(
      c.search_url("rust & go").as_str(),
      "https://api.example.com/jobs/data?search=rust+%26+go"
    );
  }

  #[test]
  fn test_detail_url_appends_id() {
    assert_eq!(
      client("https://api.example.com/jobs/data").detail_url(42).as_str(),
      "https://api.example.com/jobs/data/42"
    );
    assert_eq!(
      client("https://api.example.com/jobs/data/").detail_url(7).as_str(),
      "https://api.example.com/jobs/data/7"
    );
  }

  #[test]
  fn test_error_message_prefers_description() {
    assert_eq!(
      error_message(StatusCode::NOT_FOUND, r#"{"description":"Job not found"}"#),
      "Job not found"
    );
    assert_eq!(
      error_message(StatusCode::BAD_GATEWAY, "<html>"),
      "Request failed with status 502 Bad Gateway"
    );
  }
}
