//! # Configuration
//!
//! [`Config`] carries every path, pin and tool name the synchronizer and the
//! build invoker need. It is built once by the CLI and handed to both
//! components; neither reads global state.
//!
//! Values are layered, lowest precedence first:
//!
//! 1. The pinned defaults in [`crate::defaults`], derived from the source root.
//! 2. An optional TOML file (see [`ConfigFile`]).
//! 3. Command-line flags and their environment variables.
//!
//! ## File format
//!
//! ```toml
//! source_root = "/path/to/chromium/src"
//! crubit_dir = "/path/to/chromium/src/third_party/crubit"
//! remote_url = "https://github.com/google/crubit.git"
//! revision = "0a25665ed0df6d4f067bfd5855be1c24d2df3f6c-1"
//!
//! [bazel]
//! program = "bazel"
//! startup_options = ["--output_user_root=/tmp/bazel"]
//! target = "rs_bindings_from_cc:rs_bindings_from_cc_impl"
//! passthrough_env = ["PATH", "HOME"]
//!
//! [toolchain]
//! llvm_build_dir = "/path/to/llvm-build/Release+Asserts"
//! llvm_install_dir = "/path/to/llvm-bootstrap-install"
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::defaults;
use crate::error::{Error, Result};
use crate::revision::TargetRevision;

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Checkout root that `third_party/` hangs off.
    pub source_root: PathBuf,
    /// Working copy of the upstream repository.
    pub crubit_dir: PathBuf,
    pub remote_url: String,
    pub revision: TargetRevision,
    pub bazel: BazelConfig,
    pub toolchain: Toolchain,
}

/// How the build tool is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BazelConfig {
    pub program: String,
    /// Options placed before the command name. The build and the shutdown
    /// must both use exactly these, or the server refuses the second one.
    pub startup_options: Vec<String>,
    pub target: String,
    /// Ambient variables copied into the otherwise empty build environment.
    pub passthrough_env: Vec<String>,
}

/// Compiler suite used by the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Contains `bin/clang`, the compiler used elsewhere in the tree.
    pub llvm_build_dir: PathBuf,
    /// Headers and libraries; exported as `LLVM_INSTALL_PATH`.
    pub llvm_install_dir: PathBuf,
}

impl Toolchain {
    pub fn clang_path(&self) -> PathBuf {
        self.llvm_build_dir.join("bin").join("clang")
    }
}

impl Config {
    /// Pinned defaults for a checkout rooted at `source_root`.
    pub fn for_source_root(source_root: impl Into<PathBuf>) -> Self {
        let source_root = source_root.into();
        Self {
            crubit_dir: defaults::crubit_src_dir(&source_root),
            remote_url: defaults::CRUBIT_REMOTE_URL.to_string(),
            revision: defaults::crubit_revision(),
            bazel: BazelConfig {
                program: defaults::BAZEL_PROGRAM.to_string(),
                startup_options: Vec::new(),
                target: defaults::BUILD_TARGET.to_string(),
                passthrough_env: defaults::PASSTHROUGH_ENV
                    .iter()
                    .map(|v| v.to_string())
                    .collect(),
            },
            toolchain: Toolchain {
                llvm_build_dir: defaults::llvm_build_dir(&source_root),
                llvm_install_dir: defaults::llvm_bootstrap_install_dir(&source_root),
            },
            source_root,
        }
    }

    /// Builds a configuration from an optional file and an optional explicit
    /// source root. The explicit root beats the file's, which beats
    /// `fallback_root`.
    pub fn resolve(
        file: Option<ConfigFile>,
        source_root: Option<PathBuf>,
        fallback_root: &Path,
    ) -> Self {
        let file = file.unwrap_or_default();
        let root = source_root
            .or_else(|| file.source_root.clone())
            .unwrap_or_else(|| fallback_root.to_path_buf());

        let mut config = Self::for_source_root(root);
        config.apply_file(file);
        config
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(dir) = file.crubit_dir {
            self.crubit_dir = dir;
        }
        if let Some(url) = file.remote_url {
            self.remote_url = url;
        }
        if let Some(rev) = file.revision {
            self.revision = rev;
        }

        let bazel = file.bazel;
        if let Some(program) = bazel.program {
            self.bazel.program = program;
        }
        if let Some(opts) = bazel.startup_options {
            self.bazel.startup_options = opts;
        }
        if let Some(target) = bazel.target {
            self.bazel.target = target;
        }
        if let Some(vars) = bazel.passthrough_env {
            self.bazel.passthrough_env = vars;
        }

        let toolchain = file.toolchain;
        if let Some(dir) = toolchain.llvm_build_dir {
            self.toolchain.llvm_build_dir = dir;
        }
        if let Some(dir) = toolchain.llvm_install_dir {
            self.toolchain.llvm_install_dir = dir;
        }
    }

    /// Checks the values that cannot be fixed by running the tools.
    pub fn validate(&self) -> Result<()> {
        if self.remote_url.trim().is_empty() {
            return Err(Error::Config {
                message: "remote_url must not be empty".to_string(),
            });
        }
        if self.bazel.program.trim().is_empty() {
            return Err(Error::Config {
                message: "bazel program must not be empty".to_string(),
            });
        }
        if self.bazel.target.trim().is_empty() {
            return Err(Error::Config {
                message: "build target must not be empty".to_string(),
            });
        }
        if self.crubit_dir.parent().is_none() {
            return Err(Error::Config {
                message: format!(
                    "working copy path {} has no parent directory",
                    self.crubit_dir.display()
                ),
            });
        }
        Ok(())
    }
}

/// On-disk form of the configuration. Missing keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub source_root: Option<PathBuf>,
    pub crubit_dir: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub revision: Option<TargetRevision>,
    #[serde(default)]
    pub bazel: BazelSection,
    #[serde(default)]
    pub toolchain: ToolchainSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BazelSection {
    pub program: Option<String>,
    pub startup_options: Option<Vec<String>>,
    pub target: Option<String>,
    pub passthrough_env: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainSection {
    pub llvm_build_dir: Option<PathBuf>,
    pub llvm_install_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::parse(&content)
    }
}
