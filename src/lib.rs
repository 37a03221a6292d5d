//! Client-side data synchronization for a job-search front end.
//!
//! The pieces compose bottom-up:
//! - [`debounce::Debouncer`] settles rapidly changing search text
//! - [`storage::Persisted`] keeps a named value in durable storage
//! - [`cache::QueryClient`] deduplicates, caches and tracks staleness of fetches
//! - [`location::ActiveIdTracker`] follows the selected job through the location fragment
//! - [`jobs::JobItemsController`] sorts and paginates the cached search results
//! - [`bookmarks::Bookmarks`] persists bookmarked ids and resolves them to details

pub mod api;
pub mod bookmarks;
pub mod cache;
pub mod config;
pub mod debounce;
pub mod error;
pub mod jobs;
pub mod location;
pub mod logging;
pub mod queries;
pub mod storage;

pub use error::{Error, Result};
