use sessionlog_providers::CancelToken;
use sessionlog_types::SessionResource;
use std::collections::HashMap;
use std::time::Duration;

/// Live cancellation scope of one session's sweep
#[derive(Debug, Clone)]
pub struct PipelineController {
    token: CancelToken,
    revision: u64,
}

impl PipelineController {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Registry-wide monotonic marker; a newer pipeline has a larger revision
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// At most one live pipeline per session.
///
/// Per-session lifecycle:
/// - no entry --start--> Active
/// - Active --supersede/start--> Active' (previous token cancelled first)
/// - Active --end/dispose--> no entry (token cancelled)
///
/// A pipeline is not ended when its sweep settles: streaming producers keep
/// using the token until the session is re-swept or ended.
#[derive(Debug, Default)]
pub struct SessionPipelineRegistry {
    pipelines: HashMap<SessionResource, PipelineController>,
    next_revision: u64,
}

impl SessionPipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel and release the pipeline of `session`, returning it.
    pub fn supersede(&mut self, session: &SessionResource) -> Option<PipelineController> {
        let previous = self.pipelines.remove(session)?;
        previous.token.cancel();
        Some(previous)
    }

    /// Create and register a fresh pipeline for `session`.
    ///
    /// Any pipeline still registered for the session is cancelled before the
    /// new token is created.
    pub fn start(
        &mut self,
        session: SessionResource,
        timeout: Option<Duration>,
    ) -> PipelineController {
        self.supersede(&session);

        let token = match timeout {
            Some(timeout) => CancelToken::with_timeout(timeout),
            None => CancelToken::new(),
        };
        let controller = PipelineController {
            token,
            revision: self.next_revision,
        };
        self.next_revision += 1;

        self.pipelines.insert(session, controller.clone());
        controller
    }

    /// End the pipeline of `session`. Returns whether one was registered.
    pub fn end(&mut self, session: &SessionResource) -> bool {
        self.supersede(session).is_some()
    }

    pub fn get(&self, session: &SessionResource) -> Option<&PipelineController> {
        self.pipelines.get(session)
    }

    /// Sessions whose pipeline token is still live, with that token
    pub fn live(&self) -> Vec<(SessionResource, CancelToken)> {
        self.pipelines
            .iter()
            .filter(|(_, controller)| !controller.is_cancelled())
            .map(|(session, controller)| (session.clone(), controller.token.clone()))
            .collect()
    }

    /// Cancel and release every pipeline. Returns how many were registered.
    pub fn dispose(&mut self) -> usize {
        let count = self.pipelines.len();
        for (_, controller) in self.pipelines.drain() {
            controller.token.cancel();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}
