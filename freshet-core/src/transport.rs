//! Transport trait for freshet.
//!
//! The coordinator never talks to the network directly; it fetches through
//! this interface, so production HTTP and scripted test transports are
//! interchangeable.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::request::FetchRequest;

/// A completed transport exchange: status code plus raw body.
///
/// Interpreting the status is the caller's concern. A transport only fails
/// for transport-level reasons; a 404 or 500 is still `Ok`.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    /// HTTP status code reported by the upstream.
    pub status: u16,
    /// Raw response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Creates a response from a status and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Interface for the upstream fetch primitive.
///
/// Implementations might use:
/// - A shared `reqwest` client (production)
/// - Scripted in-memory responses (testing)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the exchange for `request`.
    ///
    /// Callers cancel an attempt by dropping the returned future, so
    /// implementations must not detach work that outlives it.
    async fn fetch(&self, request: &FetchRequest) -> Result<TransportResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(199, false)]
    #[test_case(200, true)]
    #[test_case(204, true)]
    #[test_case(299, true)]
    #[test_case(300, false)]
    #[test_case(404, false)]
    #[test_case(500, false)]
    fn test_success_boundaries(status: u16, success: bool) {
        let response = TransportResponse::new(status, "");
        assert_eq!(response.is_success(), success);
    }

    #[test]
    fn test_body_conversion() {
        let response = TransportResponse::new(200, r#"{"ok":true}"#);
        assert_eq!(response.body.as_ref(), br#"{"ok":true}"#);
    }
}
