//! The fetch client: shared cache, transport, and signal wiring.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use freshet_cache::RequestCache;
use freshet_core::{FetchOptions, FetchRequest, Transport};

use crate::config::FetchConfig;
use crate::session::{FetchSession, SessionHooks};
use crate::signals::EnvironmentSignals;
use crate::transport::HttpTransport;

/// Owns everything fetch sessions share: the cache store, the transport,
/// the signal hub, and the default configuration.
///
/// A default client reads and writes through the process-wide shared cache,
/// so independently created clients see each other's entries. Tests should
/// inject a fresh store with [`with_cache`](Self::with_cache).
///
/// # Example
///
/// ```rust,ignore
/// use freshet_client::FetchClient;
/// use serde_json::Value;
///
/// let client = FetchClient::new();
/// let session = client.subscribe::<Value>("https://api.example.com/products");
/// let products = session.watch();
/// ```
pub struct FetchClient {
    cache: Arc<RequestCache>,
    transport: Arc<dyn Transport>,
    signals: EnvironmentSignals,
    config: FetchConfig,
}

impl FetchClient {
    /// Creates a client over the shared cache and a default HTTP transport.
    pub fn new() -> Self {
        Self::with_config(FetchConfig::default())
    }

    /// Creates a client with custom default configuration.
    ///
    /// The configuration applies to every subscription made through this
    /// client unless overridden per subscription with
    /// [`subscribe_configured`](Self::subscribe_configured).
    pub fn with_config(config: FetchConfig) -> Self {
        Self {
            cache: RequestCache::shared(),
            transport: Arc::new(HttpTransport::new()),
            signals: EnvironmentSignals::new(),
            config,
        }
    }

    /// Replaces the cache store, detaching this client from the shared one.
    pub fn with_cache(mut self, cache: Arc<RequestCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Replaces the transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replaces the signal hub, letting several clients share one host
    /// integration.
    pub fn with_signals(mut self, signals: EnvironmentSignals) -> Self {
        self.signals = signals;
        self
    }

    /// The cache store backing this client's sessions.
    pub fn cache(&self) -> &Arc<RequestCache> {
        &self.cache
    }

    /// The signal hub sessions listen on.
    ///
    /// Whatever owns the host integration emits through this: call
    /// `emit_focus` when the window regains foreground focus and
    /// `emit_online` when connectivity returns.
    pub fn signals(&self) -> &EnvironmentSignals {
        &self.signals
    }

    /// The default configuration for new subscriptions.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Subscribes to a GET endpoint.
    ///
    /// Must be called from within a Tokio runtime; the session's initial
    /// fetch and its signal listener are spawned immediately.
    pub fn subscribe<T>(&self, url: impl Into<String>) -> FetchSession<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.subscribe_request(FetchRequest::get(url), SessionHooks::new())
    }

    /// Subscribes with explicit request options.
    pub fn subscribe_with_options<T>(
        &self,
        url: impl Into<String>,
        options: FetchOptions,
    ) -> FetchSession<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.subscribe_request(FetchRequest::with_options(url, options), SessionHooks::new())
    }

    /// Subscribes to a fully specified request with side-effect hooks.
    pub fn subscribe_request<T>(
        &self,
        request: FetchRequest,
        hooks: SessionHooks<T>,
    ) -> FetchSession<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.subscribe_configured(request, self.config.clone(), hooks)
    }

    /// Subscribes with a per-subscription configuration override.
    pub fn subscribe_configured<T>(
        &self,
        request: FetchRequest,
        config: FetchConfig,
        hooks: SessionHooks<T>,
    ) -> FetchSession<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        debug!(key = %request.cache_key(), "Subscribing");
        FetchSession::spawn(
            request,
            config,
            Arc::clone(&self.cache),
            Arc::clone(&self.transport),
            &self.signals,
            hooks,
        )
    }

    /// Drops every cache entry for `url`, across all option variants.
    ///
    /// Returns how many entries were removed. Live sessions keep their
    /// current `data`; their next validation repopulates the store.
    pub fn invalidate_endpoint(&self, url: &str) -> usize {
        self.cache.invalidate_prefix(url)
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}
