//! TestWorld pattern for CLI integration tests.
//!
//! Each world owns a temp directory holding a JSONL log root and a config
//! file path, so tests never read the developer's real configuration.

use anyhow::Result;
use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures::write_session_log;

/// Isolated environment for running the `sessionlog` binary.
///
/// # Example
/// ```no_run
/// use assert_cmd::cargo::cargo_bin_cmd;
/// use sessionlog_testing::TestWorld;
///
/// let world = TestWorld::new().with_session("build-1", &[]);
/// let mut cmd = cargo_bin_cmd!("sessionlog");
/// world.configure_command(&mut cmd).arg("sessions");
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    log_root: PathBuf,
    config_path: PathBuf,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let log_root = temp_dir.path().join("logs");
        let config_path = temp_dir.path().join("config.toml");
        std::fs::create_dir_all(&log_root).expect("Failed to create log root");

        Self {
            temp_dir,
            log_root,
            config_path,
        }
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn log_root(&self) -> &Path {
        &self.log_root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Write `<log_root>/<key>.jsonl`.
    pub fn with_session(self, key: &str, records: &[Value]) -> Self {
        write_session_log(&self.log_root, key, records).expect("Failed to write session log");
        self
    }

    /// Write raw TOML to the config path.
    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(&self.config_path, toml).expect("Failed to write config");
        self
    }

    /// Point a CLI command at this world's config and isolate it from
    /// the caller's environment.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--config")
            .arg(&self.config_path)
            .env_remove("SESSIONLOG_CONFIG")
            .env_remove("RUST_LOG")
            .current_dir(self.temp_dir.path());
        cmd
    }

    /// Run the binary found at `bin_path` with `args`.
    pub fn run_with(&self, bin_path: impl AsRef<std::ffi::OsStr>, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::new(bin_path);
        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;
        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }
}
