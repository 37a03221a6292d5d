//! Remote jobs API: domain types, response envelopes and the HTTP client.

mod api_types;
mod client;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use client::{JobSource, JobsClient};
pub use types::{JobDetail, JobId, JobSummary, PageDirection, SortBy};
