//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers for common patterns
//! - Test data fixtures

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Two occurrences of the `gala` event. `A1` and `B2` form a clique.
#[allow(dead_code)]
pub const GALA_FIXTURE: &str = r"
event: gala
quotas:
  - subevent: 1
    size: 3
orders:
  - code: A1
    positions:
      - subevent: 1
      - subevent: 1
  - code: B2
    positions:
      - subevent: 1
  - code: C3
    positions:
      - subevent: 1
  - code: D4
    positions:
      - subevent: 1
  - code: E5
    positions:
      - subevent: 2
  - code: F6
    status: paid
    require_approval: false
    positions:
      - subevent: 1
cliques:
  - name: crew
    password: secret
    members: [A1, B2]
";

/// Test environment with isolated data directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
    /// Path to the raffle data directory
    pub data_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    ///
    /// The data directory is not created; raffle creates it on first use.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        let data_dir = temp_path.join("raffle-data");

        Self {
            temp_dir,
            temp_path,
            data_dir,
        }
    }

    /// Get a bare command builder without pre-configured flags.
    ///
    /// Runs inside the temp directory with every `RAFFLE_*` variable the
    /// binary reads cleared, so the host environment cannot leak in.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("raffle").expect("Failed to find raffle binary");
        cmd.current_dir(&self.temp_path);
        for var in [
            "RAFFLE_DATA_DIR",
            "RAFFLE_BUSY_TIMEOUT",
            "RAFFLE_DISABLE_AUTOINIT",
            "RAFFLE_LOG_MODE",
            "RAFFLE_PROGRESS_INTERVAL",
            "RAFFLE_SEND_MAIL",
            "RAFFLE_MAXIMUM_LOCK_WAIT_SECONDS",
            "RAFFLE_DEFAULT_SEED",
            "RAFFLE_OUTPUT_FORMAT",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Get a command builder with the data directory pre-configured.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--data-dir").arg(&self.data_dir);
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file under the temp directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Import [`GALA_FIXTURE`] into this environment's database.
    pub fn import_gala(&self) {
        let fixture = self.write_file("gala.yaml", GALA_FIXTURE);
        self.command().arg("import").arg(fixture).assert().success();
    }

    /// Run a command and parse its stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .command()
            .args(args)
            .args(["--format", "json"])
            .output()
            .expect("Failed to run raffle");
        assert!(
            output.status.success(),
            "command {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
    }
}
