//! Shared harness for grit CLI integration tests.
//!
//! Spawns the compiled binary with a fully pinned identity environment so
//! object hashes are deterministic across machines.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Captured output from running a command.
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Path to the compiled `grit` binary.
pub fn grit_bin() -> PathBuf {
    let mut path = std::env::current_exe()
        .unwrap()
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    path.push("grit");
    path
}

fn pin_env(cmd: &mut Command) {
    cmd.env("GIT_AUTHOR_NAME", "Test Author")
        .env("GIT_AUTHOR_EMAIL", "author@example.com")
        .env("GIT_AUTHOR_DATE", "1234567890 +0000")
        .env("GIT_COMMITTER_NAME", "Test Committer")
        .env("GIT_COMMITTER_EMAIL", "committer@example.com")
        .env("GIT_COMMITTER_DATE", "1234567890 +0000")
        .env("TZ", "UTC")
        .env("LC_ALL", "C");
}

/// Run grit in `dir` with the given arguments.
pub fn grit(dir: &Path, args: &[&str]) -> CommandResult {
    let mut cmd = Command::new(grit_bin());
    cmd.args(args).current_dir(dir);
    pin_env(&mut cmd);
    let output = cmd.output().expect("failed to run grit");
    CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(128),
    }
}

/// Run grit with bytes piped to stdin.
pub fn grit_stdin(dir: &Path, args: &[&str], stdin_bytes: &[u8]) -> CommandResult {
    let mut cmd = Command::new(grit_bin());
    cmd.args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    pin_env(&mut cmd);
    let mut child = cmd.spawn().expect("failed to spawn grit");
    {
        use std::io::Write;
        child.stdin.take().unwrap().write_all(stdin_bytes).unwrap();
    }
    let output = child.wait_with_output().expect("failed to wait on grit");
    CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(128),
    }
}

/// Create a fresh repository in a tempdir.
pub fn init_repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let result = grit(dir.path(), &["init"]);
    assert_eq!(result.exit_code, 0, "init failed: {}", result.stderr);
    dir
}

/// Write a file under the repo and stage it.
pub fn stage_file(dir: &Path, rel: &str, content: &[u8]) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    let result = grit(dir, &["add", rel]);
    assert_eq!(result.exit_code, 0, "add failed: {}", result.stderr);
}
