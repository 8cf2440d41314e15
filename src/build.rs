//! # Build Invocation
//!
//! [`BuildInvoker`] runs the one Bazel build this tool exists for, inside the
//! synchronized working copy.
//!
//! The compiler, its C++ mode and the linker are forced through
//! `--repo_env` rather than the process environment, so they override the
//! defaults from the repository's `.bazelrc`. Each variable is blanked first
//! and then set, which drops any value inherited from the environment.
//!
//! Bazel keeps a server process alive between invocations. [`BazelServer`] is
//! a guard that shuts it down when dropped, so teardown happens after both
//! successful and failed builds. The shutdown reuses the build's startup
//! options, otherwise Bazel would kill the running server and start a new one
//! just to shut it down.

use std::env;
use std::ffi::OsString;

use log::{info, warn};

use crate::config::Config;
use crate::defaults::LLVM_INSTALL_PATH_VAR;
use crate::error::{Error, Result};
use crate::process::{CommandRunner, Invocation};

/// Compiler variables overridden through `--repo_env`.
const TOOLCHAIN_VARS: [&str; 3] = ["CC", "CXX", "LD"];

/// Runs the build and the matching shutdown.
pub struct BuildInvoker<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a Config,
}

impl<'a> BuildInvoker<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a Config) -> Self {
        Self { runner, config }
    }

    /// Builds the configured target. The build server is shut down before
    /// this returns, whatever the outcome.
    pub fn build(&self) -> Result<()> {
        let _server = BazelServer::new(self);
        self.run_build()
    }

    fn run_build(&self) -> Result<()> {
        let target = &self.config.bazel.target;
        info!("Building {} in {}", target, self.config.crubit_dir.display());

        let status = self.runner.run(&self.build_invocation())?;
        if !status.success() {
            return Err(Error::Build {
                target: target.clone(),
                status,
            });
        }
        info!("Built {}", target);
        Ok(())
    }

    /// Stops the build server. Failures are logged and otherwise ignored.
    pub fn shutdown(&self) {
        match self.runner.run(&self.shutdown_invocation()) {
            Ok(status) if status.success() => {}
            Ok(status) => warn!("bazel shutdown exited with {}", status),
            Err(e) => warn!("bazel shutdown could not run: {}", e),
        }
    }

    /// `bazel <startup options> build <target> <repo_env overrides>`
    pub fn build_invocation(&self) -> Invocation {
        self.bazel()
            .arg("build")
            .arg(&self.config.bazel.target)
            .args(self.repo_env_args())
    }

    /// `bazel <startup options> shutdown`, in the same directory and
    /// environment as the build.
    pub fn shutdown_invocation(&self) -> Invocation {
        self.bazel().arg("shutdown")
    }

    fn bazel(&self) -> Invocation {
        let bazel = &self.config.bazel;
        let mut inv = Invocation::new(&bazel.program)
            .args(&bazel.startup_options)
            .current_dir(&self.config.crubit_dir)
            .env_clear();
        for (key, value) in passthrough(&bazel.passthrough_env) {
            inv = inv.env(key, value);
        }
        inv.env(LLVM_INSTALL_PATH_VAR, &self.config.toolchain.llvm_install_dir)
    }

    /// Blanks every toolchain variable, then sets each one.
    ///
    /// Uses `bin/clang` from the LLVM build directory so the compiler matches
    /// the one used for the rest of the tree; headers and libraries come from
    /// the install directory via `LLVM_INSTALL_PATH`.
    pub fn repo_env_args(&self) -> Vec<String> {
        let clang = self.config.toolchain.clang_path().display().to_string();
        let values = [clang.clone(), format!("{clang}++"), clang];

        let blanks = TOOLCHAIN_VARS.iter().map(|var| format!("--repo_env={var}="));
        let sets = TOOLCHAIN_VARS
            .iter()
            .zip(values)
            .map(|(var, value)| format!("--repo_env={var}={value}"));
        blanks.chain(sets).collect()
    }
}

fn passthrough(names: &[String]) -> Vec<(String, OsString)> {
    names
        .iter()
        .filter_map(|name| env::var_os(name).map(|value| (name.clone(), value)))
        .collect()
}

/// Shuts the build server down when dropped.
pub struct BazelServer<'a, 'b> {
    invoker: &'b BuildInvoker<'a>,
}

impl<'a, 'b> BazelServer<'a, 'b> {
    pub fn new(invoker: &'b BuildInvoker<'a>) -> Self {
        Self { invoker }
    }
}

impl Drop for BazelServer<'_, '_> {
    fn drop(&mut self) {
        self.invoker.shutdown();
    }
}
