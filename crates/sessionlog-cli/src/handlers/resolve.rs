use anyhow::{Result, bail};
use sessionlog_runtime::Config;
use std::path::Path;

use crate::presentation::ResolvedView;
use crate::types::OutputFormat;

pub async fn handle(config: Config, root: &Path, id: &str, format: OutputFormat) -> Result<()> {
    let (log, _) = super::open_log(config, root)?;
    let resolved = log.resolve_event(id).await;
    log.dispose();

    let Some(content) = resolved else {
        bail!("no provider resolved event '{}'", id);
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&content)?),
        OutputFormat::Plain => print!("{}", ResolvedView { content: &content }),
    }
    Ok(())
}
