use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Richer content a provider can supply for a stored event id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedContent {
    Text { value: String },
    FileList { files: Vec<FileEntry> },
    Message { sections: Vec<MessageSection> },
    Json { value: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSection {
    pub name: String,
    pub content: String,
}

impl ResolvedContent {
    pub fn text(value: impl Into<String>) -> Self {
        ResolvedContent::Text {
            value: value.into(),
        }
    }

    /// One-line description for plain-text output
    pub fn summary(&self) -> String {
        match self {
            ResolvedContent::Text { value } => value.clone(),
            ResolvedContent::FileList { files } => format!("{} file(s)", files.len()),
            ResolvedContent::Message { sections } => format!("{} section(s)", sections.len()),
            ResolvedContent::Json { value } => value.to_string(),
        }
    }
}
