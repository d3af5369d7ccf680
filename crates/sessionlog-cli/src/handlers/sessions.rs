use anyhow::Result;
use serde::Serialize;
use sessionlog_providers::JsonlProvider;
use sessionlog_types::SessionResource;
use std::path::Path;

use crate::types::OutputFormat;

#[derive(Serialize)]
struct SessionRow {
    key: String,
    resource: SessionResource,
}

pub fn handle(root: &Path, format: OutputFormat) -> Result<()> {
    let keys = JsonlProvider::new(root).list_sessions()?;

    match format {
        OutputFormat::Json => {
            let rows: Vec<SessionRow> = keys
                .into_iter()
                .map(|key| SessionRow {
                    resource: SessionResource::local(&key),
                    key,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Plain => {
            if keys.is_empty() {
                eprintln!("No sessions found under {}", root.display());
            }
            for key in keys {
                println!("{}", key);
            }
        }
    }
    Ok(())
}
