//! Fixtures for sessions, events and on-disk session logs.

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use sessionlog_types::{DiagnosticEvent, ProviderEvent, SessionResource};
use std::fs;
use std::path::{Path, PathBuf};

/// `local://<key>`
pub fn session(key: &str) -> SessionResource {
    SessionResource::local(key)
}

/// Fixed reference instant so tests can order events deterministically
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// `base_time() + seconds`
pub fn at(seconds: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(seconds)
}

/// Event for `session` created `seconds` after the base time
pub fn event_at(session: &SessionResource, name: &str, seconds: i64) -> DiagnosticEvent {
    DiagnosticEvent::new(session.clone(), name).with_created(at(seconds))
}

/// Provider event created `seconds` after the base time, session left unset
pub fn provider_event_at(name: &str, seconds: i64) -> ProviderEvent {
    ProviderEvent::new(name).with_created(at(seconds))
}

/// Event names in order, for compact assertions
pub fn names<E>(events: &[E]) -> Vec<String>
where
    E: AsRef<DiagnosticEvent>,
{
    events
        .iter()
        .map(|event| event.as_ref().name.clone())
        .collect()
}

/// Write `<root>/<key>.jsonl` with one JSON value per line.
pub fn write_session_log(root: &Path, key: &str, records: &[Value]) -> Result<PathBuf> {
    fs::create_dir_all(root)?;
    let path = root.join(format!("{}.jsonl", key));

    let mut content = String::new();
    for record in records {
        content.push_str(&serde_json::to_string(record)?);
        content.push('\n');
    }
    fs::write(&path, content)?;
    Ok(path)
}
