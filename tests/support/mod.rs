#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tdl::storage::parse_tasks;
use tdl::Task;
use tempfile::TempDir;

/// Isolated data + config directories for driving the `tdl` binary.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("tdl.toml")
    }

    pub fn blob_path(&self) -> PathBuf {
        self.data_dir().join("todos.json")
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.config_path();
        fs::write(&path, contents).expect("write config");
        path
    }

    pub fn write_blob(&self, contents: &str) {
        fs::create_dir_all(self.data_dir()).expect("create data dir");
        fs::write(self.blob_path(), contents).expect("write blob");
    }

    pub fn stored_tasks(&self) -> Vec<Task> {
        match fs::read_to_string(self.blob_path()) {
            Ok(raw) => parse_tasks(&raw),
            Err(_) => Vec::new(),
        }
    }

    /// `tdl` with this home's data dir and config, isolated from the
    /// caller's environment.
    pub fn tdl(&self) -> Command {
        let mut cmd = Command::cargo_bin("tdl").expect("binary");
        cmd.env_remove("TDL_DATA_DIR")
            .env_remove("TDL_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--data-dir")
            .arg(self.data_dir())
            .arg("--config")
            .arg(self.config_path());
        cmd
    }

    /// Run a command with `--json` and return the parsed envelope.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .tdl()
            .arg("--json")
            .args(args)
            .output()
            .expect("run tdl");
        serde_json::from_slice(&output.stdout).expect("json envelope")
    }
}
