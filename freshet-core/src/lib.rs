//! # Freshet Core
//!
//! Core types, errors, and traits for the freshet request-caching stack.
//!
//! This crate provides the foundational building blocks used by the other
//! freshet crates:
//!
//! - **Requests**: The request model and its canonical cache-key derivation
//! - **Errors**: The failure taxonomy for fetch attempts
//! - **Traits**: The transport interface the coordinator fetches through
//!
//! ## Example
//!
//! ```rust
//! use freshet_core::{FetchOptions, FetchRequest, HttpMethod};
//!
//! let request = FetchRequest::with_options(
//!     "https://api.example.com/products",
//!     FetchOptions::new().method(HttpMethod::Get).header("accept", "application/json"),
//! );
//!
//! // Two structurally equal requests always share one cache key.
//! assert_eq!(request.cache_key(), request.clone().cache_key());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod error;
pub mod request;
pub mod transport;

// Re-export commonly used items at crate root
pub use error::{FetchError, Result};
pub use request::{FetchOptions, FetchRequest, HttpMethod};
pub use transport::{Transport, TransportResponse};
