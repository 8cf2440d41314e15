//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_working_copy().with_fake_bazel(0);
//!     fixture.command().arg("--skip-checkout").assert().success();
//! }
//! ```

#![allow(dead_code)]

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::{git_available, git_stdout, TestFixture, Upstream};
}

/// Returns `true` if a `git` executable can be run.
///
/// Tests that drive real git call this first and return early when it is
/// missing.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Runs `git -C dir args...` and returns trimmed stdout. Panics on failure.
pub fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(args)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A local repository standing in for the remote.
pub struct Upstream {
    dir: assert_fs::TempDir,
}

impl Upstream {
    /// A repository with a single commit containing `README.md`.
    pub fn new() -> Self {
        let dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        git_stdout(dir.path(), &["init", "--quiet"]);
        let upstream = Self { dir };
        upstream.commit("README.md", "crubit\n");
        upstream
    }

    /// Writes `path` and commits it. Returns the new commit hash.
    pub fn commit(&self, path: &str, content: &str) -> String {
        self.dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        git_stdout(self.path(), &["add", path]);
        git_stdout(self.path(), &["commit", "--quiet", "-m", path]);
        self.head()
    }

    pub fn head(&self) -> String {
        git_stdout(self.path(), &["rev-parse", "HEAD"])
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Clone URL for this repository.
    pub fn url(&self) -> String {
        self.path().display().to_string()
    }
}

impl Default for Upstream {
    fn default() -> Self {
        Self::new()
    }
}

/// A temporary source root with a fake `bazel` that logs its arguments.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates `third_party/crubit` so `--skip-checkout` has something to build.
    pub fn with_working_copy(self) -> Self {
        self.temp_dir
            .child("third_party/crubit/WORKSPACE")
            .write_str("")
            .expect("Failed to create working copy");
        self
    }

    /// Writes a config file and returns the fixture.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("crubit-builder.toml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Installs a fake bazel: `build` exits with `build_exit_code`, every
    /// other command exits 0. Each call appends its arguments, plus the
    /// environment it saw, to [`bazel_log`](Self::bazel_log).
    #[cfg(unix)]
    pub fn with_fake_bazel(self, build_exit_code: i32) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let log = self.bazel_log_path();
        let script = format!(
            "#!/bin/sh\n\
             echo \"$*\" >> '{log}'\n\
             echo \"env LLVM_INSTALL_PATH=$LLVM_INSTALL_PATH LEAK=$CRUBIT_BUILDER_TEST_LEAK\" >> '{log}'\n\
             case \"$1\" in\n\
               build) exit {build_exit_code} ;;\n\
             esac\n\
             exit 0\n",
            log = log.display(),
        );
        let path = self.bazel_path();
        std::fs::write(&path, script).expect("Failed to write fake bazel");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake bazel executable");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn crubit_dir(&self) -> PathBuf {
        self.path().join("third_party").join("crubit")
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("crubit-builder.toml")
    }

    pub fn bazel_path(&self) -> PathBuf {
        self.path().join("fake-bazel")
    }

    fn bazel_log_path(&self) -> PathBuf {
        self.path().join("bazel.log")
    }

    /// Everything the fake bazel recorded, or an empty string if it never ran.
    pub fn bazel_log(&self) -> String {
        std::fs::read_to_string(self.bazel_log_path()).unwrap_or_default()
    }

    /// Lines recording a `shutdown` command.
    pub fn shutdown_count(&self) -> usize {
        self.bazel_log()
            .lines()
            .filter(|l| l.trim_end().ends_with("shutdown"))
            .count()
    }

    /// A command running the binary against this source root and fake bazel.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("crubit-builder");
        cmd.current_dir(self.path())
            .env_remove("CRUBIT_BUILDER_CONFIG")
            .env_remove("RUST_LOG")
            .env("CRUBIT_BUILDER_SOURCE_ROOT", self.path())
            .env("CRUBIT_BUILDER_BAZEL", self.bazel_path());
        cmd
    }

    /// Like [`command`](Self::command), with `--config` pointing at the
    /// fixture's config file.
    pub fn command_with_config(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("--config").arg(self.config_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
