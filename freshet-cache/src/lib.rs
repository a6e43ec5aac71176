//! TTL request cache for freshet.
//!
//! In-memory store keyed by request identity, with per-entry expiration and
//! lazy eviction on access.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;

pub use cache::{CacheConfig, CacheStats, RequestCache};
