use anyhow::Result;
use sessionlog_runtime::{Config, resolve_config_path};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};
use crate::handlers;
use crate::types::LogLevel;

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_level);

    let config_path = resolve_config_path(cli.config.as_deref())?;
    let config = Config::load_from(&config_path)?;
    tracing::debug!(path = %config_path.display(), "loaded config");

    match cli.command {
        Commands::Sessions { root } => handlers::sessions::handle(&root, cli.format),
        Commands::Dump {
            root,
            session,
            min_level,
        } => {
            handlers::dump::handle(
                config,
                &root,
                &session,
                min_level.map(LogLevel::event_level),
                cli.format,
            )
            .await
        }
        Commands::Resolve { root, id } => {
            handlers::resolve::handle(config, &root, &id, cli.format).await
        }
    }
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    // A second init (e.g. in tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
