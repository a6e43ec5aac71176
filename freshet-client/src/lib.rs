//! # Freshet Client
//!
//! Cached fetch coordination over the freshet request cache: stale-while-
//! revalidate reads, deduplication of overlapping validations, retry with
//! exponential backoff under a fixed per-attempt deadline, and revalidation
//! driven by host signals (foreground regained, connectivity restored).
//!
//! ## Example
//!
//! ```rust,ignore
//! use freshet_client::{FetchClient, FetchConfig};
//! use serde_json::Value;
//!
//! let client = FetchClient::new();
//! let session = client.subscribe::<Value>("https://api.example.com/products");
//!
//! let mut state = session.watch();
//! while state.changed().await.is_ok() {
//!     if let Some(products) = &state.borrow().data {
//!         println!("{products}");
//!         break;
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod client;
mod config;
mod session;
mod signals;
mod transport;

pub use client::FetchClient;
pub use config::FetchConfig;
pub use session::{ErrorCallback, FetchSession, FetchState, SessionHooks, SuccessCallback};
pub use signals::EnvironmentSignals;
pub use transport::HttpTransport;

pub use freshet_cache::RequestCache;
pub use freshet_core::{
    FetchError, FetchOptions, FetchRequest, HttpMethod, Result, Transport, TransportResponse,
};
