//! Shared helpers for driving the `termwrite` binary in integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const SETTINGS_VARS: [&str; 5] = [
    "TERMWRITE_PATH",
    "TERMWRITE_ON_CORRUPT",
    "TERMWRITE_WRITE_MODE",
    "TERMWRITE_MAX_BYTES",
    "RUST_LOG",
];

/// Temp directory holding one termination message file.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn create() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn message_path(&self) -> PathBuf {
        self.dir.path().join("termination")
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents.as_bytes()).expect("write file");
        path
    }

    pub fn read_json(&self, path: &Path) -> serde_json::Value {
        let text = std::fs::read_to_string(path).expect("read message");
        serde_json::from_str(&text).expect("parse message")
    }
}

/// A `termwrite` command with the `TERMWRITE_*` environment cleared.
pub fn termwrite() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_termwrite"));
    for var in SETTINGS_VARS {
        command.env_remove(var);
    }
    command.stdin(Stdio::null());
    command
}

pub fn run(command: &mut Command) -> Output {
    command.output().expect("run termwrite")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
