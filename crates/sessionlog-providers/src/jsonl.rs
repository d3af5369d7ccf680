use async_trait::async_trait;
use serde::Deserialize;
use sessionlog_types::{ProviderEvent, ResolvedContent, SessionResource};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::token::CancelToken;
use crate::traits::DebugLogProvider;

/// One line of a session log file
#[derive(Debug, Deserialize)]
struct JsonlRecord {
    #[serde(flatten)]
    event: ProviderEvent,

    /// Content returned by `resolve_event` for this record's id
    #[serde(default)]
    resolved: Option<ResolvedContent>,
}

/// Provider backed by a directory of `<session-key>.jsonl` files.
///
/// The session key is the path part of the session resource, so
/// `local://build-42` reads `<root>/build-42.jsonl`. Malformed lines are
/// skipped with a warning; a missing file yields no events.
#[derive(Debug, Clone)]
pub struct JsonlProvider {
    id: String,
    root: PathBuf,
}

impl JsonlProvider {
    pub const DEFAULT_ID: &'static str = "jsonl";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            id: Self::DEFAULT_ID.to_string(),
            root: root.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the records of `session`
    pub fn session_file(&self, session: &SessionResource) -> Result<PathBuf> {
        let key = session.path();
        if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
            return Err(Error::Provider(format!(
                "invalid session key '{}' in {}",
                key, session
            )));
        }
        Ok(self.root.join(format!("{}.jsonl", key)))
    }

    /// Session keys with a log file under the root, sorted
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some("jsonl")
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn read_records(path: &Path) -> Result<Option<Vec<JsonlRecord>>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::Io(err)),
        };
        Ok(Some(parse_records(&content, path)))
    }
}

fn parse_records(content: &str, source: &Path) -> Vec<JsonlRecord> {
    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<JsonlRecord>(line) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(
                    path = %source.display(),
                    line = index + 1,
                    error = %err,
                    "skipping malformed record"
                );
            }
        }
    }
    records
}

#[async_trait]
impl DebugLogProvider for JsonlProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn provide_events(
        &self,
        session: &SessionResource,
        token: &CancelToken,
    ) -> anyhow::Result<Vec<ProviderEvent>> {
        let path = self.session_file(session)?;
        if token.is_cancelled() {
            return Ok(Vec::new());
        }

        let Some(records) = Self::read_records(&path).await? else {
            debug!(path = %path.display(), "no log file for session");
            return Ok(Vec::new());
        };

        if token.is_cancelled() {
            debug!(%session, "sweep cancelled while reading");
            return Ok(Vec::new());
        }

        Ok(records.into_iter().map(|record| record.event).collect())
    }

    async fn resolve_event(
        &self,
        id: &str,
        token: &CancelToken,
    ) -> anyhow::Result<Option<ResolvedContent>> {
        for key in self.list_sessions()? {
            if token.is_cancelled() {
                return Ok(None);
            }

            let path = self.root.join(format!("{}.jsonl", key));
            let Some(records) = Self::read_records(&path).await? else {
                continue;
            };

            let found = records
                .into_iter()
                .find(|record| record.event.id.as_deref() == Some(id) && record.resolved.is_some())
                .and_then(|record| record.resolved);
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }
}
