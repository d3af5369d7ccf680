//! Provider orchestration over the bounded diagnostic log.
//!
//! [`DebugLog`] is the entry point. It owns the event store, one cancellable
//! pipeline per session, and the set of registered providers.

pub mod config;
pub mod error;
pub mod failure;
pub mod log;
pub mod pipeline;
pub mod scope;
pub mod stream;

pub use config::{Config, resolve_config_path};
pub use error::{Error, Result};
pub use failure::{ErrorSink, ProviderFailure, ProviderOperation, tracing_sink};
pub use log::{DebugLog, DebugLogBuilder, InvokeSummary, LogOptions, ProviderRegistration};
pub use pipeline::{PipelineController, SessionPipelineRegistry};
pub use scope::SessionScope;
pub use stream::LiveStream;

pub use sessionlog_engine::{EventFilter, Origin};
