//! Shared fixtures for CLI specs

#![allow(dead_code)]

use std::path::Path;
use std::process::Output;
use tempfile::TempDir;

/// Lease-based lock with a short heartbeat
pub const FAIL_OPEN_CONFIG: &str = r#"
owner = "spec-runner"

[table]
name = "locks"
partition_key = "id"

[fail_open]
lease_duration = "10s"
heartbeat_period = "100ms"
"#;

/// Exclusive lock with a short retry
pub const FAIL_CLOSED_CONFIG: &str = r#"
owner = "spec-runner"

[table]
name = "locks"
partition_key = "id"

[fail_closed]
acquire_period = "10ms"
retry_count = 1
"#;

/// Exclusive lock on a table with a sort key
pub const SORTED_CONFIG: &str = r#"
[table]
name = "locks"
partition_key = "id"
sort_key = "shard"

[fail_closed]
acquire_period = "10ms"
"#;

/// A temporary project directory
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn fail_open() -> Self {
        let project = Self::empty();
        project.file("ddlock.toml", FAIL_OPEN_CONFIG);
        project
    }

    pub fn fail_closed() -> Self {
        let project = Self::empty();
        project.file("ddlock.toml", FAIL_CLOSED_CONFIG);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root
    pub fn file(&self, path: &str, content: &str) {
        let path = self.dir.path().join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Store a lock record held by another process
    pub fn held_by_other(&self, id: &str) {
        let doc = format!(
            r#"{{"entries":[{{"key":{{"id":{{"S":"{id}"}}}},"item":{{"id":{{"S":"{id}"}},"owner":{{"S":"other"}},"guid":{{"S":"theirs"}}}}}}]}}"#
        );
        self.file(".ddlock/locks.json", &doc);
    }

    pub fn ddlock(&self) -> CliBuilder {
        let mut cmd = assert_cmd::Command::cargo_bin("ddlock").unwrap();
        cmd.current_dir(self.dir.path());
        cmd.env_remove("RUST_LOG");
        CliBuilder { cmd }
    }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require success
    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            run.output.status,
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and require failure
    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            !run.output.status.success(),
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and require a specific exit code
    pub fn exits_with(mut self, code: i32) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert_eq!(
            run.output.status.code(),
            Some(code),
            "stderr:\n{}",
            run.stderr()
        );
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).to_string()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).to_string()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout should contain {:?}\nstdout:\n{}",
            expected,
            stdout
        );
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr should contain {:?}\nstderr:\n{}",
            expected,
            stderr
        );
        self
    }

    pub fn stderr_lacks(self, unexpected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            !stderr.contains(unexpected),
            "stderr should not contain {:?}\nstderr:\n{}",
            unexpected,
            stderr
        );
        self
    }
}
