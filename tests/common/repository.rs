//! Git repository management and setup utilities
//!
//! Provides functions for creating test repositories with history and for running
//! the binary against them with isolated cache and config directories.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test repository together with the directories the binary should use.
/// The TempDirs must be kept alive for the duration of the test.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
    pub home: TempDir,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The binary, run inside the repository with XDG directories under `home`.
    pub fn command(&self) -> anyhow::Result<Command> {
        let mut cmd = Command::cargo_bin("changes-cache")?;
        cmd.current_dir(&self.path)
            .env("XDG_CACHE_HOME", self.home.path().join("cache"))
            .env("XDG_CONFIG_HOME", self.home.path().join("config"))
            .env("NO_COLOR", "1");
        Ok(cmd)
    }
}

fn git(repo_path: &Path, args: &[&str]) -> anyhow::Result<()> {
    std::process::Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()?;
    Ok(())
}

/// Sets up a fresh git repository for testing
pub fn setup_test_repo() -> anyhow::Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let home = TempDir::new()?;
    let path = temp_dir.path().to_path_buf();

    git(&path, &["init"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    Ok(TestRepo {
        temp_dir,
        path,
        home,
    })
}

/// Writes `content` to `filename` and commits it with `message`
pub fn commit_file(repo_path: &Path, filename: &str, content: &str, message: &str) -> anyhow::Result<()> {
    fs::write(repo_path.join(filename), content)?;
    git(repo_path, &["add", filename])?;
    git(repo_path, &["commit", "-m", message])?;
    Ok(())
}

/// Sets up a repository with three commits, each adding one file
pub fn setup_repo_with_history() -> anyhow::Result<TestRepo> {
    let repo = setup_test_repo()?;
    commit_file(&repo.path, "a.txt", "one\n", "Add a")?;
    commit_file(&repo.path, "b.txt", "two\n", "Add b")?;
    commit_file(&repo.path, "c.txt", "three\n", "Add c")?;
    Ok(repo)
}
