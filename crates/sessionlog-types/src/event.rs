use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::session::SessionResource;

// NOTE: Event model
//
// - DiagnosticEvent is immutable once stored; the buffer hands out Arc clones.
// - `id` is optional and NOT unique. Internally logged events usually have none;
//   provider events carry one so richer content can be resolved later.
// - `created` is not monotonic across producers. Readers sort by it.
// - ProviderEvent is what providers return: session and timestamp may be
//   omitted and are filled in by the orchestrator when the event is stored.

/// Severity of a diagnostic event
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(Error::Parse(format!("unknown log level '{}'", other))),
        }
    }
}

/// What an event describes.
///
/// Kind-specific payload lives in `DiagnosticEvent::details`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventKind {
    #[default]
    Generic,
    UserMessage,
    AgentResponse,
    FileList,
    ResolvedMessage,
    /// Provider-defined kind not known to this crate
    Other(String),
}

/// One recorded occurrence tied to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub session_resource: SessionResource,

    pub created: DateTime<Utc>,

    #[serde(default)]
    pub kind: EventKind,

    /// Short label
    pub name: String,

    /// Raw provider/kind-specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,

    #[serde(default)]
    pub level: LogLevel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<String>,
}

impl DiagnosticEvent {
    pub fn new(session_resource: SessionResource, name: impl Into<String>) -> Self {
        Self {
            id: None,
            session_resource,
            created: Utc::now(),
            kind: EventKind::Generic,
            name: name.into(),
            details: None,
            level: LogLevel::Info,
            category: None,
            parent_event_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_parent(mut self, parent_event_id: impl Into<String>) -> Self {
        self.parent_event_id = Some(parent_event_id.into());
        self
    }
}

/// Event as produced by a provider, before it is bound to a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_resource: Option<SessionResource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default)]
    pub kind: EventKind,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,

    #[serde(default)]
    pub level: LogLevel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<String>,
}

impl ProviderEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_session(mut self, session: SessionResource) -> Self {
        self.session_resource = Some(session);
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Bind to a session, defaulting the session and timestamp when omitted.
    pub fn into_event(self, default_session: &SessionResource) -> DiagnosticEvent {
        DiagnosticEvent {
            id: self.id,
            session_resource: self
                .session_resource
                .unwrap_or_else(|| default_session.clone()),
            created: self.created.unwrap_or_else(Utc::now),
            kind: self.kind,
            name: self.name,
            details: self.details,
            level: self.level,
            category: self.category,
            parent_event_id: self.parent_event_id,
        }
    }
}
