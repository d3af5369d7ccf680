use anyhow::Result;
use async_trait::async_trait;
use sessionlog_types::{ProviderEvent, ResolvedContent, SessionResource};

use crate::token::CancelToken;

/// External source of diagnostic events for a session
///
/// Responsibilities:
/// - Return the events it knows for a session when asked
/// - Optionally resolve richer content for an event id
/// - Observe the token and stop producing once it is cancelled
///
/// Failures are reported and skipped by the caller; a provider can never
/// abort a sweep or a resolution.
#[async_trait]
pub trait DebugLogProvider: Send + Sync {
    /// Stable name used in failure reports and traces
    fn id(&self) -> &str;

    /// Fetch the events this provider has for `session`.
    ///
    /// Events that omit their session are attributed to `session`.
    async fn provide_events(
        &self,
        session: &SessionResource,
        token: &CancelToken,
    ) -> Result<Vec<ProviderEvent>>;

    /// Resolve richer content for an event id.
    ///
    /// `Ok(None)` means this provider does not know the id.
    async fn resolve_event(&self, id: &str, token: &CancelToken) -> Result<Option<ResolvedContent>> {
        let _ = (id, token);
        Ok(None)
    }
}
