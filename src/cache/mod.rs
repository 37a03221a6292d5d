//! Request cache shared by every consumer of remote data.
//!
//! This module provides a query cache in the spirit of TanStack Query that:
//! - Keys every logical query by kind and parameters (`QueryKey`)
//! - Deduplicates concurrent requests for the same key
//! - Refetches only once cached data is older than the stale time
//! - Holds failures for a retry delay, then lets the next read request again
//! - Evicts entries left untouched for longer than the stale time
//! - Aggregates loading state across several keys read together
//! - Discards responses superseded by a newer request for the same key

mod client;
mod entry;
mod keys;

pub use client::{ErrorHook, QueryClient};
pub use entry::{
  Batch, CacheEntry, QueryOptions, QueryStatus, DEFAULT_RETRY_DELAY, DEFAULT_STALE_TIME,
};
pub use keys::QueryKey;
