//! Error types for freshet.
//!
//! This module provides the failure taxonomy for fetch attempts using
//! `thiserror`. Consumers can distinguish timeouts, upstream HTTP failures,
//! transport failures, and deliberate cancellation.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using `FetchError`.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Main error type for all fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The attempt exceeded the fixed deadline and was aborted.
    #[error("Request timed out after {after:?}")]
    Timeout {
        /// The deadline that elapsed.
        after: Duration,
    },

    /// The upstream responded with a non-success status.
    #[error("HTTP error: status {status}")]
    Http {
        /// Status code reported by the upstream.
        status: u16,
        /// Response body text, when one was readable.
        detail: String,
    },

    /// Transport-level failure (DNS, connect, TLS, broken stream).
    #[error("Network request failed: {0}")]
    Network(String),

    /// The request was deliberately canceled by its owner.
    #[error("Request aborted")]
    Aborted,

    /// The response body could not be decoded into the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request could not be constructed (empty or malformed URL).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Returns true if a retry may succeed.
    ///
    /// Deliberate cancellation and malformed requests are terminal; every
    /// other failure mode is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout { .. }
                | FetchError::Http { .. }
                | FetchError::Network(_)
                | FetchError::Decode(_)
        )
    }

    /// Returns true if this is the fixed-deadline timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }

    /// Returns the upstream HTTP status code, for `Http` failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
