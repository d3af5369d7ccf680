use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{LogLevel, OutputFormat};

#[derive(Parser)]
#[command(name = "sessionlog")]
#[command(about = "Sweep session logs into a bounded diagnostic log and query it", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to $SESSIONLOG_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    /// Level for sessionlog's own traces on stderr; RUST_LOG takes precedence
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List session keys that have a log file under ROOT
    Sessions {
        #[arg(long)]
        root: PathBuf,
    },

    /// Sweep one session and print its events in chronological order
    Dump {
        #[arg(long)]
        root: PathBuf,

        /// Session key (`build-1`) or full resource (`local://build-1`)
        #[arg(long)]
        session: String,

        #[arg(long)]
        min_level: Option<LogLevel>,
    },

    /// Print the resolved content of an event id
    Resolve {
        #[arg(long)]
        root: PathBuf,

        #[arg(long)]
        id: String,
    },
}
