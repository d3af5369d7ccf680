use anyhow::{Result, bail};
use sessionlog_runtime::{Config, EventFilter};
use sessionlog_types::{DiagnosticEvent, LogLevel, SessionResource};
use std::path::Path;

use crate::presentation::{EventLine, use_color};
use crate::types::OutputFormat;

pub async fn handle(
    config: Config,
    root: &Path,
    session: &str,
    min_level: Option<LogLevel>,
    format: OutputFormat,
) -> Result<()> {
    let session = parse_session(session);
    let (log, provider) = super::open_log(config, root)?;
    provider.session_file(&session)?;

    let summary = log.invoke_providers(&session).await?;
    if summary.revision.is_none() {
        bail!("session '{}' is outside the configured scope", session);
    }
    tracing::debug!(stored = summary.stored, failed = summary.failed, "sweep finished");

    let mut filter = EventFilter::all().session(session);
    if let Some(level) = min_level {
        filter = filter.min_level(level);
    }
    let events = log.query(&filter);
    log.dispose();

    match format {
        OutputFormat::Json => {
            let events: Vec<&DiagnosticEvent> = events.iter().map(|event| event.as_ref()).collect();
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        OutputFormat::Plain => {
            let color = use_color();
            for event in &events {
                println!("{}", EventLine { event, color });
            }
        }
    }
    Ok(())
}

/// Bare keys become `local://<key>`
fn parse_session(raw: &str) -> SessionResource {
    if raw.contains("://") {
        SessionResource::new(raw)
    } else {
        SessionResource::local(raw)
    }
}
