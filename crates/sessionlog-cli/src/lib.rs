// NOTE: sessionlog CLI
//
// - One DebugLog per invocation, built from the resolved config file.
// - The JSONL directory is the only provider; every command is a single sweep
//   or lookup, so pipelines are disposed before the process exits.
// - Provider failures go to stderr through tracing, never to stdout.

mod args;
mod commands;
mod handlers;
pub mod presentation;
pub mod types;

pub use args::{Cli, Commands};
pub use commands::run;
