pub mod dump;
pub mod resolve;
pub mod sessions;

use sessionlog_providers::JsonlProvider;
use sessionlog_runtime::{Config, DebugLog};
use std::path::Path;
use std::sync::Arc;

/// Log with the JSONL directory registered as its only provider
fn open_log(config: Config, root: &Path) -> anyhow::Result<(DebugLog, JsonlProvider)> {
    let log = DebugLog::new(config);
    let provider = JsonlProvider::new(root);
    log.register_provider(Arc::new(provider.clone()))?;
    Ok((log, provider))
}
