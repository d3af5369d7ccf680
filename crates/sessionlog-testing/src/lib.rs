//! Testing infrastructure for sessionlog tests.
//!
//! - `providers`: scripted, failing and panicking provider doubles
//! - `fixtures`: sessions, timestamped events and JSONL log files
//! - `world`: isolated environment for driving the CLI binary

pub mod fixtures;
pub mod providers;
pub mod world;

pub use world::TestWorld;
