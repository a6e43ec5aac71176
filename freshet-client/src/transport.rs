//! HTTP transport backed by a shared `reqwest` client.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use freshet_core::{FetchError, FetchRequest, HttpMethod, Result, Transport, TransportResponse};

/// Production transport over `reqwest`.
///
/// No client-level timeout is configured here: the coordinator enforces the
/// per-attempt deadline itself and cancels by dropping the in-flight future.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Creates a transport over an existing client, keeping the caller's
    /// connection pool, proxy, and TLS settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &FetchRequest) -> Result<TransportResponse> {
        request.validate()?;
        let url = Url::parse(&request.url).map_err(|e| {
            FetchError::InvalidRequest(format!("unparseable URL '{}': {}", request.url, e))
        })?;

        let method = match request.options.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        };

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.options.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.options.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        debug!(url = %request.url, status, bytes = body.len(), "Transport exchange complete");
        Ok(TransportResponse { status, body })
    }
}
