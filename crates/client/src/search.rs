//! Debounced incremental search against the catalog service.
//!
//! Keystrokes arrive faster than the catalog service should be queried, so
//! the pipeline coalesces them: each call to [`input`](SearchPipeline::input)
//! advances a generation counter and arms a quiet-period timer. When the
//! timer fires, the request is issued only if its generation is still the
//! latest; when a response arrives, it is committed only if its query is
//! still the last one issued. A superseded request's response is discarded
//! wholesale - the rendered results always belong to the newest query,
//! regardless of network reordering.
//!
//! Queries shorter than the minimum length never arm a timer; they clear
//! the visible results synchronously. A query identical to the last one
//! issued is suppressed at timer wakeup, so cursor movement and retyping
//! do not re-query; the suppression key is dropped as soon as a different
//! query is typed, so only consecutive repeats are deduplicated.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::instrument;

use shopsync_core::Product;

use crate::config::ClientConfig;
use crate::gateway::RemoteGateway;
use crate::notify::{NotificationKind, Notifier};

const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);
const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Observable search state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// The latest raw input, trimmed.
    pub query: String,
    /// Results for the newest committed response.
    pub results: Vec<Product>,
    /// Whether a request is currently in flight for the latest generation.
    pub searching: bool,
    /// Whether the results panel should be rendered at all.
    pub results_visible: bool,
}

struct PipelineState {
    /// Bumped on every input; a timer or response whose generation no
    /// longer matches is stale and must not touch the view.
    generation: u64,
    /// The last query actually sent to the service, for duplicate
    /// suppression. Cleared whenever a different query is typed, on
    /// dismiss, and on failure, so only a consecutive identical query is
    /// suppressed and a failed one can be retried.
    last_issued: Option<String>,
    view: SearchState,
}

struct PipelineInner<G> {
    gateway: G,
    notifier: Notifier,
    debounce_window: Duration,
    min_query_len: usize,
    state: Mutex<PipelineState>,
}

/// The debounced search pipeline.
///
/// Cheaply cloneable; clones share the generation counter and view.
pub struct SearchPipeline<G> {
    inner: Arc<PipelineInner<G>>,
}

impl<G> Clone for SearchPipeline<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: RemoteGateway + 'static> SearchPipeline<G> {
    /// Create a pipeline with the default 300ms window and 2-character
    /// minimum.
    #[must_use]
    pub fn new(gateway: G, notifier: Notifier) -> Self {
        Self::with_settings(
            gateway,
            notifier,
            DEFAULT_DEBOUNCE_WINDOW,
            DEFAULT_MIN_QUERY_LEN,
        )
    }

    /// Create a pipeline with the configured window and minimum length.
    #[must_use]
    pub fn from_config(gateway: G, notifier: Notifier, config: &ClientConfig) -> Self {
        Self::with_settings(
            gateway,
            notifier,
            config.debounce_window,
            config.min_query_len,
        )
    }

    /// Create a pipeline with explicit timing settings.
    #[must_use]
    pub fn with_settings(
        gateway: G,
        notifier: Notifier,
        debounce_window: Duration,
        min_query_len: usize,
    ) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                gateway,
                notifier,
                debounce_window,
                min_query_len,
                state: Mutex::new(PipelineState {
                    generation: 0,
                    last_issued: None,
                    view: SearchState::default(),
                }),
            }),
        }
    }

    /// The current observable state.
    #[must_use]
    pub fn read(&self) -> SearchState {
        self.inner.lock().view.clone()
    }

    /// Feed one unit of raw input.
    ///
    /// Synchronous: below the minimum length the visible results are
    /// cleared before this returns, and no request will be issued for any
    /// earlier input either. At or above the minimum length a quiet-period
    /// timer is armed; only the newest armed timer can lead to a request.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn input(&self, raw: &str) {
        let query = raw.trim().to_string();
        let generation;
        {
            let mut state = self.inner.lock();
            state.generation += 1;
            generation = state.generation;
            state.view.query.clone_from(&query);

            if query.chars().count() < self.inner.min_query_len {
                // Invalidated every pending timer and in-flight response
                // by bumping the generation above.
                state.view.results.clear();
                state.view.results_visible = false;
                state.view.searching = false;
                state.last_issued = None;
                return;
            }

            if state.last_issued.as_deref() != Some(query.as_str()) {
                state.last_issued = None;
            }
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.debounce_window).await;
            inner.fire(generation, query).await;
        });
    }

    /// Hide the results panel without forgetting the results.
    ///
    /// Any pending timer or in-flight request is invalidated; the next
    /// input starts fresh.
    pub fn dismiss(&self) {
        let mut state = self.inner.lock();
        state.generation += 1;
        state.last_issued = None;
        state.view.results_visible = false;
        state.view.searching = false;
    }
}

impl<G: RemoteGateway> PipelineInner<G> {
    #[instrument(skip(self, query))]
    async fn fire(&self, generation: u64, query: String) {
        {
            let mut state = self.lock();
            if state.generation != generation {
                // A newer input arrived during the quiet period.
                return;
            }
            if state.last_issued.as_deref() == Some(query.as_str()) {
                // A request for this exact query is in flight or already
                // rendered; its response is the one to show.
                return;
            }
            state.last_issued = Some(query.clone());
            state.view.searching = true;
        }

        let result = self.gateway.search_products(&query).await;

        let mut state = self.lock();
        if state.last_issued.as_deref() != Some(query.as_str()) {
            // Superseded while in flight; the response belongs to an
            // abandoned query.
            return;
        }
        state.view.searching = false;
        match result {
            Ok(products) => {
                state.view.results = products;
                state.view.results_visible = true;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Search request failed");
                state.view.results.clear();
                state.view.results_visible = true;
                state.last_issued = None;
                self.notifier
                    .error(NotificationKind::Search, "Search failed. Please try again.");
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
