//! Provider doubles for orchestration tests.
//!
//! Every double records nothing it does not need to. `ScriptedProvider` is the
//! one to reach for when a test has to observe tokens or control timing.

use anyhow::{Result, bail};
use async_trait::async_trait;
use sessionlog_providers::{CancelToken, DebugLogProvider};
use sessionlog_types::{ProviderEvent, ResolvedContent, SessionResource};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns the same events for every session.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    id: String,
    events: Vec<ProviderEvent>,
}

impl StaticProvider {
    pub fn new(id: &str, events: Vec<ProviderEvent>) -> Self {
        Self {
            id: id.to_string(),
            events,
        }
    }
}

#[async_trait]
impl DebugLogProvider for StaticProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn provide_events(
        &self,
        _session: &SessionResource,
        _token: &CancelToken,
    ) -> Result<Vec<ProviderEvent>> {
        Ok(self.events.clone())
    }
}

/// Provides no events; resolves ids from a fixed map.
#[derive(Debug, Clone, Default)]
pub struct ResolvingProvider {
    id: String,
    resolved: HashMap<String, ResolvedContent>,
}

impl ResolvingProvider {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            resolved: HashMap::new(),
        }
    }

    pub fn with(mut self, event_id: &str, content: ResolvedContent) -> Self {
        self.resolved.insert(event_id.to_string(), content);
        self
    }
}

#[async_trait]
impl DebugLogProvider for ResolvingProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn provide_events(
        &self,
        _session: &SessionResource,
        _token: &CancelToken,
    ) -> Result<Vec<ProviderEvent>> {
        Ok(Vec::new())
    }

    async fn resolve_event(&self, id: &str, _token: &CancelToken) -> Result<Option<ResolvedContent>> {
        Ok(self.resolved.get(id).cloned())
    }
}

/// Fails every call with the same message.
#[derive(Debug, Clone)]
pub struct FailingProvider {
    id: String,
    message: String,
}

impl FailingProvider {
    pub fn new(id: &str, message: &str) -> Self {
        Self {
            id: id.to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl DebugLogProvider for FailingProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn provide_events(
        &self,
        _session: &SessionResource,
        _token: &CancelToken,
    ) -> Result<Vec<ProviderEvent>> {
        bail!("{}", self.message)
    }

    async fn resolve_event(&self, _id: &str, _token: &CancelToken) -> Result<Option<ResolvedContent>> {
        bail!("{}", self.message)
    }
}

/// Panics on every call.
#[derive(Debug, Clone)]
pub struct PanickingProvider {
    id: String,
}

impl PanickingProvider {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl DebugLogProvider for PanickingProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn provide_events(
        &self,
        session: &SessionResource,
        _token: &CancelToken,
    ) -> Result<Vec<ProviderEvent>> {
        panic!("provider {} exploded for {}", self.id, session)
    }

    async fn resolve_event(&self, id: &str, _token: &CancelToken) -> Result<Option<ResolvedContent>> {
        panic!("provider {} exploded resolving {}", self.id, id)
    }
}

/// What a [`ScriptedProvider`] does for one `provide_events` call
#[derive(Debug, Clone)]
pub enum Step {
    /// Return immediately
    Return(Vec<ProviderEvent>),
    /// Fail immediately
    Fail(String),
    /// Wait until the token is cancelled, then return the events anyway
    ReturnAfterCancel(Vec<ProviderEvent>),
}

/// One recorded `provide_events` invocation
#[derive(Debug, Clone)]
pub struct Call {
    pub session: SessionResource,
    pub token: CancelToken,
}

/// Plays back a queue of steps and records every call with its token.
///
/// Once the queue is empty each call returns no events.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    id: String,
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
    called: Notify,
}

impl ScriptedProvider {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn then(self, step: Step) -> Self {
        lock(&self.steps).push_back(step);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Wait until at least `count` calls have been recorded.
    pub async fn wait_for_calls(&self, count: usize) {
        loop {
            let notified = self.called.notified();
            if self.call_count() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl DebugLogProvider for ScriptedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn provide_events(
        &self,
        session: &SessionResource,
        token: &CancelToken,
    ) -> Result<Vec<ProviderEvent>> {
        let step = lock(&self.steps).pop_front();
        lock(&self.calls).push(Call {
            session: session.clone(),
            token: token.clone(),
        });
        self.called.notify_waiters();

        match step {
            None => Ok(Vec::new()),
            Some(Step::Return(events)) => Ok(events),
            Some(Step::Fail(message)) => bail!("{}", message),
            Some(Step::ReturnAfterCancel(events)) => {
                token.cancelled().await;
                Ok(events)
            }
        }
    }
}
