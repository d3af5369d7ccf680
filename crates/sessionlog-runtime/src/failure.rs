use sessionlog_types::SessionResource;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Provider call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOperation {
    ProvideEvents,
    ResolveEvent,
}

impl fmt::Display for ProviderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderOperation::ProvideEvents => write!(f, "provide_events"),
            ProviderOperation::ResolveEvent => write!(f, "resolve_event"),
        }
    }
}

/// A recovered provider failure, handed to the error sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: String,
    pub operation: ProviderOperation,
    pub session: Option<SessionResource>,
    pub message: String,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider '{}' failed in {}", self.provider, self.operation)?;
        if let Some(session) = &self.session {
            write!(f, " for {}", session)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Receives provider failures. Never sees anything fatal: the log keeps working.
pub type ErrorSink = Arc<dyn Fn(&ProviderFailure) + Send + Sync>;

/// Default sink: one `warn` trace per failure
pub fn tracing_sink() -> ErrorSink {
    Arc::new(|failure: &ProviderFailure| {
        warn!(
            provider = %failure.provider,
            operation = %failure.operation,
            session = failure.session.as_ref().map(|s| s.as_str()),
            error = %failure.message,
            "provider failed"
        );
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}
