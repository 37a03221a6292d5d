//! Error types shared by the synchronization core.

use thiserror::Error;

/// Failures the core can observe.
///
/// Errors are `Clone` because a failed fetch is stored inside its cache entry and
/// handed out with every snapshot of that entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// Non-2xx response, transport failure or an unreadable response body.
  #[error("{0}")]
  Network(String),

  /// A persisted value could not be decoded.
  #[error("failed to parse stored value for '{key}': {message}")]
  Parse { key: String, message: String },

  /// The durable store itself failed.
  #[error("storage error: {0}")]
  Storage(String),
}

impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self {
    Error::Network(e.to_string())
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    Error::Storage(e.to_string())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
