//! Fetch sessions: the per-key request lifecycle.
//!
//! A [`FetchSession`] owns the cached-fetch state machine for one request
//! key: cache-first reads, deduplication of overlapping validations, retry
//! with exponential backoff, a fixed per-attempt deadline, and revalidation
//! driven by host signals. Consumers observe progress through the session's
//! [`FetchState`], either by polling or through a watch channel.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use freshet_cache::RequestCache;
use freshet_core::{FetchError, FetchRequest, Result, Transport};

use crate::config::FetchConfig;
use crate::signals::EnvironmentSignals;

/// Hook invoked with each successfully obtained value, cached or fetched.
pub type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Hook invoked once automatic retries are exhausted, or immediately for
/// terminal failures.
pub type ErrorCallback = Arc<dyn Fn(&FetchError) + Send + Sync>;

/// Optional side-effect hooks for a session.
///
/// Hooks run on the session's own tasks; keep them quick and non-blocking.
pub struct SessionHooks<T> {
    pub(crate) on_success: Option<SuccessCallback<T>>,
    pub(crate) on_error: Option<ErrorCallback>,
}

impl<T> SessionHooks<T> {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self {
            on_success: None,
            on_error: None,
        }
    }

    /// Attaches a success hook.
    pub fn on_success(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(hook));
        self
    }

    /// Attaches an error hook.
    pub fn on_error(mut self, hook: impl Fn(&FetchError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }
}

impl<T> Default for SessionHooks<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Observable state of a fetch session.
#[derive(Clone, Debug)]
pub struct FetchState<T> {
    /// Last known value, from cache or network; `None` if never resolved
    pub data: Option<T>,
    /// Last failure; cleared by a subsequent success
    pub error: Option<Arc<FetchError>>,
    /// True only while no value has ever been obtained and a request is
    /// outstanding
    pub is_loading: bool,
    /// True while a network request is in flight
    pub is_validating: bool,
}

impl<T> FetchState<T> {
    fn initial() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: true,
            is_validating: false,
        }
    }
}

/// Why a fetch pass is running; selects cache and early-return behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FetchIntent {
    /// First fetch after subscribing; a fresh cache hit fully satisfies it.
    Initial,
    /// Signal-triggered refresh; serves a fresh hit, then hits the network
    /// anyway.
    Revalidate,
    /// Manual refetch; never consults the cache.
    Refetch,
    /// Scheduled retry after a failure; never consults the cache.
    Retry,
}

impl FetchIntent {
    fn uses_cache(self) -> bool {
        matches!(self, FetchIntent::Initial | FetchIntent::Revalidate)
    }
}

/// Bookkeeping guarded by the session lock.
struct SessionCore {
    /// Consecutive failures since the last success
    retry_count: u32,
    /// When the most recent attempt was initiated
    last_fetch_at: Option<Instant>,
    /// Bumped on every initiation and cancellation; attempts carrying a
    /// stale generation discard their outcome
    generation: u64,
    /// Pending backoff timer, if a retry is armed
    retry_task: Option<JoinHandle<()>>,
}

struct SessionInner<T> {
    request: FetchRequest,
    key: String,
    config: FetchConfig,
    cache: Arc<RequestCache>,
    transport: Arc<dyn Transport>,
    state_tx: watch::Sender<FetchState<T>>,
    core: Mutex<SessionCore>,
    hooks: SessionHooks<T>,
}

impl<T> SessionInner<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// One pass of the fetch lifecycle.
    #[instrument(skip(self, intent), fields(key = %self.key, intent = ?intent))]
    async fn fetch(self: Arc<Self>, intent: FetchIntent) {
        // Cache-first intents may be satisfied without the network.
        if intent.uses_cache() {
            if let Some(value) = self.cache.get(&self.key) {
                match serde_json::from_value::<T>(value) {
                    Ok(data) => {
                        let validating = self.state_tx.borrow().is_validating;
                        self.apply_cached(&data);
                        if intent == FetchIntent::Initial && !validating {
                            return;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "Cached payload no longer decodes; evicting");
                        self.cache.remove(&self.key);
                    }
                }
            }
        }

        // Dedup check and initiation share one critical section so two
        // passes racing on the multi-threaded runtime cannot both see the
        // window clear and issue concurrent calls for the same key.
        let generation = {
            let mut core = self.core.lock();

            // Deduplication window: a recent initiation covers this fetch
            // when a validation is still in flight, or unconditionally for
            // trigger-driven revalidation (which throttles focus/reconnect
            // bursts).
            let validating = self.state_tx.borrow().is_validating;
            let recent = core
                .last_fetch_at
                .map(|at| at.elapsed() < self.config.deduping_interval)
                .unwrap_or(false);
            if recent && (validating || intent == FetchIntent::Revalidate) {
                debug!("Deduplicated; a recent validation covers this fetch");
                return;
            }

            // Initiate a new attempt. Bumping the generation makes any older
            // in-flight attempt and any armed retry obsolete.
            core.generation += 1;
            core.last_fetch_at = Some(Instant::now());
            if let Some(task) = core.retry_task.take() {
                task.abort();
            }
            self.state_tx.send_modify(|state| {
                state.is_validating = true;
                state.is_loading = state.data.is_none();
            });
            core.generation
        };

        debug!(generation, "Fetch initiated");

        let attempt = timeout(
            self.config.request_timeout,
            self.transport.fetch(&self.request),
        )
        .await;
        let outcome = match attempt {
            Ok(result) => result,
            // Dropping the transport future is what cancels the request
            Err(_) => Err(FetchError::Timeout {
                after: self.config.request_timeout,
            }),
        };

        match outcome {
            Ok(response) if response.is_success() => match Self::decode_payload(&response.body) {
                Ok((value, data)) => self.apply_success(generation, value, data),
                Err(err) => self.apply_failure(generation, err),
            },
            Ok(response) => {
                let detail = String::from_utf8_lossy(&response.body).into_owned();
                self.apply_failure(
                    generation,
                    FetchError::Http {
                        status: response.status,
                        detail,
                    },
                );
            }
            Err(err) => self.apply_failure(generation, err),
        }
    }

    fn decode_payload(body: &[u8]) -> Result<(Value, T)> {
        let value: Value = serde_json::from_slice(body)?;
        let data: T = serde_json::from_value(value.clone())?;
        Ok((value, data))
    }

    /// Surfaces a cached value without touching validation state. A previous
    /// error stays visible until a network success clears it.
    fn apply_cached(&self, data: &T) {
        self.state_tx.send_modify(|state| {
            state.data = Some(data.clone());
            state.is_loading = false;
        });
        debug!(key = %self.key, "Serving cached value");
        if let Some(hook) = &self.hooks.on_success {
            hook(data);
        }
    }

    fn apply_success(&self, generation: u64, value: Value, data: T) {
        {
            let mut core = self.core.lock();
            if core.generation != generation {
                debug!(key = %self.key, "Discarding superseded response");
                return;
            }
            core.retry_count = 0;
            if let Some(task) = core.retry_task.take() {
                task.abort();
            }
            self.cache
                .set_with_ttl(self.key.clone(), value, self.config.cache_ttl);
            self.state_tx.send_modify(|state| {
                state.data = Some(data.clone());
                state.error = None;
                state.is_loading = false;
                state.is_validating = false;
            });
        }
        debug!(key = %self.key, "Fetch succeeded");
        if let Some(hook) = &self.hooks.on_success {
            hook(&data);
        }
    }

    fn apply_failure(self: Arc<Self>, generation: u64, err: FetchError) {
        warn!(key = %self.key, error = %err, "Fetch attempt failed");
        let err = Arc::new(err);

        {
            let mut core = self.core.lock();
            if core.generation != generation {
                debug!(key = %self.key, "Discarding superseded failure");
                return;
            }
            self.state_tx.send_modify(|state| {
                state.error = Some(Arc::clone(&err));
                state.is_loading = false;
                state.is_validating = false;
            });

            if matches!(*err, FetchError::Aborted) {
                // Deliberate cancellation: no retry, no error hook
                return;
            }

            if err.is_retryable() && core.retry_count < self.config.retry_count {
                let attempt = core.retry_count;
                core.retry_count += 1;
                let delay = self.config.retry_backoff(attempt);
                let armed_generation = core.generation;
                debug!(
                    key = %self.key,
                    attempt = attempt + 1,
                    max = self.config.retry_count,
                    ?delay,
                    "Scheduling retry"
                );
                let inner = Arc::clone(&self);
                core.retry_task = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    {
                        let mut core = inner.core.lock();
                        if core.generation != armed_generation {
                            return;
                        }
                        // Clear our own handle before fetching so the new
                        // initiation does not abort the task it runs on
                        core.retry_task = None;
                    }
                    inner.fetch(FetchIntent::Retry).await;
                }));
                return;
            }
        }

        debug!(key = %self.key, "No retries left; surfacing error");
        if let Some(hook) = &self.hooks.on_error {
            hook(&err);
        }
    }

    /// Cancels in-flight work: outstanding attempts are orphaned by a
    /// generation bump and any armed retry timer is aborted.
    fn cancel_current(&self) {
        let mut core = self.core.lock();
        core.generation += 1;
        if let Some(task) = core.retry_task.take() {
            task.abort();
        }
        let validating = self.state_tx.borrow().is_validating;
        if validating {
            self.state_tx.send_modify(|state| {
                state.error = Some(Arc::new(FetchError::Aborted));
                state.is_loading = false;
                state.is_validating = false;
            });
            debug!(key = %self.key, "Canceled in-flight validation");
        }
    }
}

/// Live subscription to one request key.
///
/// Spawning a session immediately starts its initial fetch and, when enabled
/// by the configuration, a listener for focus/reconnect revalidation.
/// Dropping the session tears down both along with any pending retry.
pub struct FetchSession<T> {
    inner: Arc<SessionInner<T>>,
    state_rx: watch::Receiver<FetchState<T>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<T> FetchSession<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub(crate) fn spawn(
        request: FetchRequest,
        config: FetchConfig,
        cache: Arc<RequestCache>,
        transport: Arc<dyn Transport>,
        signals: &EnvironmentSignals,
        hooks: SessionHooks<T>,
    ) -> Self {
        let key = request.cache_key();
        let (state_tx, state_rx) = watch::channel(FetchState::initial());
        let inner = Arc::new(SessionInner {
            request,
            key,
            config,
            cache,
            transport,
            state_tx,
            core: Mutex::new(SessionCore {
                retry_count: 0,
                last_fetch_at: None,
                generation: 0,
                retry_task: None,
            }),
            hooks,
        });

        let mut tasks = Vec::with_capacity(2);

        let initial = Arc::clone(&inner);
        tasks.push(tokio::spawn(async move {
            initial.fetch(FetchIntent::Initial).await;
        }));

        let listen_focus = inner.config.revalidate_on_focus;
        let listen_online = inner.config.revalidate_on_reconnect;
        if listen_focus || listen_online {
            // Subscribe before returning so emits right after spawn are seen
            let mut focus_rx = signals.on_focus();
            let mut online_rx = signals.on_online();
            let listener = Arc::clone(&inner);
            tasks.push(tokio::spawn(async move {
                loop {
                    let received = tokio::select! {
                        received = focus_rx.recv(), if listen_focus => received,
                        received = online_rx.recv(), if listen_online => received,
                    };
                    match received {
                        // A lagged receiver just collapses the burst into
                        // one revalidation
                        Ok(()) | Err(RecvError::Lagged(_)) => {
                            Arc::clone(&listener).fetch(FetchIntent::Revalidate).await;
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }));
        }

        Self {
            inner,
            state_rx,
            tasks,
        }
    }

    /// The cache key this session is bound to.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState<T> {
        self.state_rx.borrow().clone()
    }

    /// Last known value, if any.
    pub fn data(&self) -> Option<T> {
        self.state_rx.borrow().data.clone()
    }

    /// Last failure, if any.
    pub fn error(&self) -> Option<Arc<FetchError>> {
        self.state_rx.borrow().error.clone()
    }

    /// True only while no value has ever been obtained and a request is
    /// outstanding.
    pub fn is_loading(&self) -> bool {
        self.state_rx.borrow().is_loading
    }

    /// True while a network request is in flight.
    pub fn is_validating(&self) -> bool {
        self.state_rx.borrow().is_validating
    }

    /// A watch channel over the session state, for callers that want to
    /// await transitions instead of polling.
    pub fn watch(&self) -> watch::Receiver<FetchState<T>> {
        self.state_rx.clone()
    }

    /// Forces a network fetch, bypassing the cache.
    ///
    /// Collapses into an already in-flight validation when one was initiated
    /// within the deduplication window.
    pub async fn refetch(&self) {
        Arc::clone(&self.inner).fetch(FetchIntent::Refetch).await;
    }

    /// Optimistically overwrites the current value and the cache entry
    /// without a network call.
    pub fn mutate(&self, value: T) {
        match serde_json::to_value(&value) {
            Ok(json) => {
                self.inner
                    .cache
                    .set_with_ttl(self.inner.key.clone(), json, self.inner.config.cache_ttl);
            }
            Err(err) => {
                warn!(key = %self.inner.key, error = %err, "Mutated value is not cacheable");
            }
        }
        self.inner.state_tx.send_modify(|state| {
            state.data = Some(value);
            state.is_loading = false;
        });
    }

    /// Like [`mutate`](Self::mutate), but derives the new value from the
    /// previous one.
    pub fn mutate_with(&self, update: impl FnOnce(Option<&T>) -> T) {
        let current = self.state_rx.borrow().data.clone();
        self.mutate(update(current.as_ref()));
    }

    /// Cancels in-flight work for this session.
    ///
    /// A pending validation surfaces as an [`FetchError::Aborted`] error and
    /// its eventual outcome is discarded; any armed retry is dropped. The
    /// session stays usable afterwards.
    pub fn cancel(&self) {
        self.inner.cancel_current();
    }
}

impl<T> Drop for FetchSession<T> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        if let Some(task) = self.inner.core.lock().retry_task.take() {
            task.abort();
        }
    }
}
