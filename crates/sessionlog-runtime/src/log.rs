use futures::FutureExt;
use serde_json::Value;
use sessionlog_engine::{EventFilter, EventStore, Origin};
use sessionlog_providers::{CancelToken, DebugLogProvider, ProviderId, ProviderSet};
use sessionlog_types::{DiagnosticEvent, EventKind, LogLevel, ResolvedContent, SessionResource};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::Config;
use crate::failure::{ErrorSink, ProviderFailure, ProviderOperation, panic_message, tracing_sink};
use crate::pipeline::SessionPipelineRegistry;
use crate::scope::SessionScope;
use crate::stream::{LiveStream, Observers};
use crate::{Error, Result};

// NOTE: Concurrency model
//
// - Three independent mutexes: event state, pipeline registry, provider set.
//   None is ever held across an `.await`, so each mutation runs to completion
//   before any other step observes it.
// - Lock order when nesting: providers -> pipelines -> state.
// - Providers run in spawned tasks. A failing or panicking provider is
//   reported to the error sink and never reaches the caller.
// - A pipeline outlives its sweep. Streaming producers keep the token and
//   push through `add_provider_event` until the session is re-swept or ended.

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Optional attributes for [`DebugLog::log_with`]
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub id: Option<String>,
    pub kind: EventKind,
    pub category: Option<String>,
    pub parent_event_id: Option<String>,
}

impl LogOptions {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn parent(mut self, parent_event_id: impl Into<String>) -> Self {
        self.parent_event_id = Some(parent_event_id.into());
        self
    }
}

/// Outcome of one provider sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvokeSummary {
    /// Revision of the pipeline created for the sweep; `None` when the
    /// session was outside the scope and nothing ran
    pub revision: Option<u64>,
    pub providers: usize,
    pub stored: usize,
    pub discarded: usize,
    pub failed: usize,
}

enum TaskOutcome {
    Stored(usize),
    Discarded(usize),
    Failed,
}

struct State {
    store: EventStore,
    observers: Observers,
}

struct Inner {
    scope: SessionScope,
    provider_timeout: Option<Duration>,
    discard_after_cancel: bool,
    error_sink: ErrorSink,
    disposed: AtomicBool,
    state: Mutex<State>,
    pipelines: Mutex<SessionPipelineRegistry>,
    providers: Mutex<ProviderSet>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let pipelines = self
            .pipelines
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        pipelines.dispose();
    }
}

pub struct DebugLogBuilder {
    config: Config,
    scope: Option<SessionScope>,
    error_sink: Option<ErrorSink>,
}

impl DebugLogBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Overrides the scheme scope derived from the config
    pub fn scope(mut self, scope: SessionScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn error_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&ProviderFailure) + Send + Sync + 'static,
    {
        self.error_sink = Some(Arc::new(sink));
        self
    }

    pub fn build(self) -> DebugLog {
        let scope = self
            .scope
            .unwrap_or_else(|| SessionScope::from_schemes(&self.config.local_schemes));

        DebugLog {
            inner: Arc::new(Inner {
                scope,
                provider_timeout: self.config.provider_timeout(),
                discard_after_cancel: self.config.discard_after_cancel,
                error_sink: self.error_sink.unwrap_or_else(tracing_sink),
                disposed: AtomicBool::new(false),
                state: Mutex::new(State {
                    store: EventStore::new(self.config.capacity),
                    observers: Observers::default(),
                }),
                pipelines: Mutex::new(SessionPipelineRegistry::new()),
                providers: Mutex::new(ProviderSet::new()),
            }),
        }
    }
}

/// Session-scoped diagnostic event log with provider orchestration.
///
/// Cheap to clone; clones share the same buffer, pipelines and providers.
/// Construct one per embedding system and pass it explicitly to consumers.
#[derive(Clone)]
pub struct DebugLog {
    inner: Arc<Inner>,
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl fmt::Debug for DebugLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugLog")
            .field("events", &self.len())
            .field("providers", &self.provider_count())
            .field("scope", &self.inner.scope)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl DebugLog {
    pub fn new(config: Config) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> DebugLogBuilder {
        DebugLogBuilder {
            config: Config::default(),
            scope: None,
            error_sink: None,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            Err(Error::Disposed)
        } else {
            Ok(())
        }
    }

    // --- Writing ---

    /// Record an internally logged event. Sessions outside the scope are
    /// ignored.
    pub fn log(
        &self,
        session: &SessionResource,
        name: impl Into<String>,
        details: Option<Value>,
        level: LogLevel,
    ) {
        self.log_with(session, name, details, level, LogOptions::default());
    }

    pub fn log_with(
        &self,
        session: &SessionResource,
        name: impl Into<String>,
        details: Option<Value>,
        level: LogLevel,
        options: LogOptions,
    ) {
        if !self.inner.scope.admits(session) {
            debug!(%session, "ignoring log for session outside scope");
            return;
        }

        let mut event = DiagnosticEvent::new(session.clone(), name)
            .with_level(level)
            .with_kind(options.kind);
        event.id = options.id;
        event.details = details;
        event.category = options.category;
        event.parent_event_id = options.parent_event_id;

        self.append(event, Origin::Internal);
    }

    /// Append an event as internally logged and notify subscribers.
    pub fn add_event(&self, event: DiagnosticEvent) {
        self.append(event, Origin::Internal);
    }

    /// Append an event tagged as provider-sourced. Such events are removed
    /// when their session is swept again.
    pub fn add_provider_event(&self, event: DiagnosticEvent) {
        self.append(event, Origin::Provider);
    }

    fn append(&self, event: DiagnosticEvent, origin: Origin) {
        if self.is_disposed() {
            debug!(name = %event.name, "ignoring event appended after dispose");
            return;
        }

        let mut state = lock(&self.inner.state);
        let stored = state.store.append(event, origin);
        // A zero-capacity store retains nothing, so there is nothing to announce
        if state.store.capacity() > 0 {
            state.observers.notify(&stored);
        }
    }

    // --- Reading ---

    /// Events sorted by creation time, optionally limited to one session.
    pub fn get_events(&self, session: Option<&SessionResource>) -> Vec<Arc<DiagnosticEvent>> {
        let filter = match session {
            Some(session) => EventFilter::all().session(session.clone()),
            None => EventFilter::all(),
        };
        self.query(&filter)
    }

    pub fn query(&self, filter: &EventFilter) -> Vec<Arc<DiagnosticEvent>> {
        lock(&self.inner.state).store.events(filter)
    }

    /// Sessions with retained events, in first-seen order
    pub fn get_session_resources(&self) -> Vec<SessionResource> {
        lock(&self.inner.state).store.session_resources()
    }

    /// Whether a retained event came from a provider. `None` when the event
    /// is no longer (or never was) in the buffer.
    pub fn origin_of(&self, event: &Arc<DiagnosticEvent>) -> Option<Origin> {
        lock(&self.inner.state).store.origin_of(event)
    }

    pub fn len(&self) -> usize {
        lock(&self.inner.state).store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        lock(&self.inner.state).store.capacity()
    }

    /// Drop all stored events. Pipelines are unaffected.
    pub fn clear(&self) {
        lock(&self.inner.state).store.clear();
    }

    /// Stream of events appended from now on
    pub fn subscribe(&self) -> LiveStream {
        lock(&self.inner.state).observers.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.state).observers.len()
    }

    // --- Providers ---

    /// Register a provider.
    ///
    /// The provider immediately joins every live pipeline, using that
    /// pipeline's existing token; nothing is cancelled or restarted.
    pub fn register_provider(
        &self,
        provider: Arc<dyn DebugLogProvider>,
    ) -> Result<ProviderRegistration> {
        let (id, live) = {
            let mut providers = lock(&self.inner.providers);
            let pipelines = lock(&self.inner.pipelines);
            if self.is_disposed() {
                return Err(Error::Disposed);
            }
            (providers.insert(Arc::clone(&provider)), pipelines.live())
        };
        debug!(provider = provider.id(), %id, "registered provider");

        if !live.is_empty() {
            match Handle::try_current() {
                Ok(handle) => {
                    for (session, token) in live {
                        debug!(provider = provider.id(), %session, "joining live pipeline");
                        let log = self.clone();
                        let provider = Arc::clone(&provider);
                        handle.spawn(async move {
                            log.run_provider(provider, session, token).await;
                        });
                    }
                }
                Err(_) => {
                    warn!(
                        provider = provider.id(),
                        sessions = live.len(),
                        "no async runtime; provider will not join live pipelines"
                    );
                }
            }
        }

        Ok(ProviderRegistration {
            id,
            log: Arc::downgrade(&self.inner),
        })
    }

    /// Remove a registration. Tasks already running for it are not cancelled.
    pub fn unregister_provider(&self, id: ProviderId) -> bool {
        let removed = lock(&self.inner.providers).remove(id);
        if let Some(provider) = &removed {
            debug!(provider = provider.id(), %id, "unregistered provider");
        }
        removed.is_some()
    }

    pub fn provider_count(&self) -> usize {
        lock(&self.inner.providers).len()
    }

    // --- Pipelines ---

    /// Sweep every registered provider for `session`.
    ///
    /// Supersedes the session's previous pipeline, removes the session's
    /// provider-sourced events, then runs all providers concurrently and waits
    /// for every one of them to settle. Provider failures are reported to the
    /// error sink; the only error returned is [`Error::Disposed`].
    pub async fn invoke_providers(&self, session: &SessionResource) -> Result<InvokeSummary> {
        self.ensure_live()?;
        if !self.inner.scope.admits(session) {
            debug!(%session, "ignoring sweep for session outside scope");
            return Ok(InvokeSummary::default());
        }

        // Providers stay locked until the fan-out list is taken so a provider
        // registering concurrently either joins the snapshot or catches up on
        // the new pipeline, never both.
        let (controller, providers) = {
            let providers = lock(&self.inner.providers);
            let mut pipelines = lock(&self.inner.pipelines);
            if self.is_disposed() {
                return Err(Error::Disposed);
            }

            if let Some(previous) = pipelines.supersede(session) {
                debug!(%session, revision = previous.revision(), "superseded pipeline");
            }

            let removed = lock(&self.inner.state)
                .store
                .remove_provider_events(session);
            if removed > 0 {
                debug!(%session, removed, "removed provider events before sweep");
            }

            let controller = pipelines.start(session.clone(), self.inner.provider_timeout);
            (controller, providers.snapshot())
        };

        let mut summary = InvokeSummary {
            revision: Some(controller.revision()),
            providers: providers.len(),
            ..InvokeSummary::default()
        };

        let mut tasks = JoinSet::new();
        for provider in providers {
            let log = self.clone();
            let session = session.clone();
            let token = controller.token().clone();
            tasks.spawn(async move { log.run_provider(provider, session, token).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(TaskOutcome::Stored(count)) => summary.stored += count,
                Ok(TaskOutcome::Discarded(count)) => summary.discarded += count,
                Ok(TaskOutcome::Failed) => summary.failed += 1,
                Err(err) => {
                    summary.failed += 1;
                    warn!(%session, error = %err, "provider task did not complete");
                }
            }
        }

        debug!(
            %session,
            revision = controller.revision(),
            providers = summary.providers,
            stored = summary.stored,
            failed = summary.failed,
            "sweep settled"
        );
        Ok(summary)
    }

    async fn run_provider(
        self,
        provider: Arc<dyn DebugLogProvider>,
        session: SessionResource,
        token: CancelToken,
    ) -> TaskOutcome {
        let result = AssertUnwindSafe(provider.provide_events(&session, &token))
            .catch_unwind()
            .await;

        let events = match result {
            Ok(Ok(events)) => events,
            Ok(Err(err)) => {
                self.report(ProviderFailure {
                    provider: provider.id().to_string(),
                    operation: ProviderOperation::ProvideEvents,
                    session: Some(session),
                    message: format!("{:#}", err),
                });
                return TaskOutcome::Failed;
            }
            Err(payload) => {
                self.report(ProviderFailure {
                    provider: provider.id().to_string(),
                    operation: ProviderOperation::ProvideEvents,
                    session: Some(session),
                    message: panic_message(payload.as_ref()),
                });
                return TaskOutcome::Failed;
            }
        };

        if self.inner.discard_after_cancel && token.is_cancelled() {
            debug!(
                provider = provider.id(),
                %session,
                count = events.len(),
                "discarding results delivered after cancellation"
            );
            return TaskOutcome::Discarded(events.len());
        }

        let count = events.len();
        for event in events {
            self.add_provider_event(event.into_event(&session));
        }
        TaskOutcome::Stored(count)
    }

    /// Cancel and release the pipeline of `session`. Stored events remain.
    pub fn end_session(&self, session: &SessionResource) -> bool {
        let ended = lock(&self.inner.pipelines).end(session);
        if ended {
            debug!(%session, "ended pipeline");
        }
        ended
    }

    /// Sessions with a live, non-cancelled pipeline, sorted
    pub fn active_sessions(&self) -> Vec<SessionResource> {
        let mut sessions: Vec<SessionResource> = lock(&self.inner.pipelines)
            .live()
            .into_iter()
            .map(|(session, _)| session)
            .collect();
        sessions.sort();
        sessions
    }

    /// Revision of the pipeline currently registered for `session`
    pub fn pipeline_revision(&self, session: &SessionResource) -> Option<u64> {
        lock(&self.inner.pipelines)
            .get(session)
            .map(|controller| controller.revision())
    }

    /// Token of the pipeline currently registered for `session`, for
    /// producers that keep streaming after the sweep settled
    pub fn pipeline_token(&self, session: &SessionResource) -> Option<CancelToken> {
        lock(&self.inner.pipelines)
            .get(session)
            .map(|controller| controller.token().clone())
    }

    // --- Resolution ---

    /// First content resolved for `id`, asking providers in registration
    /// order. Providers that fail or do not know the id are skipped.
    pub async fn resolve_event(&self, id: &str) -> Option<ResolvedContent> {
        let token = match self.inner.provider_timeout {
            Some(timeout) => CancelToken::with_timeout(timeout),
            None => CancelToken::new(),
        };
        self.resolve_event_with(id, &token).await
    }

    pub async fn resolve_event_with(&self, id: &str, token: &CancelToken) -> Option<ResolvedContent> {
        let providers = lock(&self.inner.providers).snapshot();

        for provider in providers {
            let result = AssertUnwindSafe(provider.resolve_event(id, token))
                .catch_unwind()
                .await;

            let message = match result {
                Ok(Ok(Some(content))) => return Some(content),
                Ok(Ok(None)) => continue,
                Ok(Err(err)) => format!("{:#}", err),
                Err(payload) => panic_message(payload.as_ref()),
            };
            self.report(ProviderFailure {
                provider: provider.id().to_string(),
                operation: ProviderOperation::ResolveEvent,
                session: None,
                message,
            });
        }
        None
    }

    // --- Teardown ---

    /// Cancel every pipeline and refuse further sweeps and registrations.
    /// Stored events stay readable. Idempotent.
    pub fn dispose(&self) {
        let mut pipelines = lock(&self.inner.pipelines);
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let count = pipelines.dispose();
        debug!(pipelines = count, "disposed debug log");
    }

    fn report(&self, failure: ProviderFailure) {
        (self.inner.error_sink)(&failure);
    }
}

/// Handle returned by [`DebugLog::register_provider`].
///
/// Dropping the handle keeps the provider registered; call
/// [`ProviderRegistration::unregister`] to remove it.
#[derive(Debug)]
pub struct ProviderRegistration {
    id: ProviderId,
    log: Weak<Inner>,
}

impl ProviderRegistration {
    pub fn id(&self) -> ProviderId {
        self.id
    }

    /// Returns false when the provider was already removed or the log is gone.
    pub fn unregister(self) -> bool {
        match self.log.upgrade() {
            Some(inner) => DebugLog { inner }.unregister_provider(self.id),
            None => false,
        }
    }
}
