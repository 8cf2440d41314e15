//! Default values for crubit-builder configuration.
//!
//! Everything pinned by the build recipe lives here. [`crate::config::Config`]
//! starts from these values; nothing else in the crate reads them directly.

use std::path::{Path, PathBuf};

use crate::revision::TargetRevision;

/// Trunk on 2022-06-13.
pub const CRUBIT_REVISION: &str = "0a25665ed0df6d4f067bfd5855be1c24d2df3f6c";
/// Bump when the build recipe changes without moving [`CRUBIT_REVISION`].
pub const CRUBIT_SUB_REVISION: u32 = 1;

pub const CRUBIT_REMOTE_URL: &str = "https://github.com/google/crubit.git";

/// The one target this tool builds.
pub const BUILD_TARGET: &str = "rs_bindings_from_cc:rs_bindings_from_cc_impl";

pub const BAZEL_PROGRAM: &str = "bazel";

/// Names the toolchain installation directory in the build environment.
pub const LLVM_INSTALL_PATH_VAR: &str = "LLVM_INSTALL_PATH";

/// Ambient variables still visible to the build tool.
pub const PASSTHROUGH_ENV: &[&str] = &["PATH", "HOME"];

pub const THIRD_PARTY_DIR: &str = "third_party";
pub const CRUBIT_DIR_NAME: &str = "crubit";

pub fn crubit_revision() -> TargetRevision {
    TargetRevision::new(CRUBIT_REVISION, CRUBIT_SUB_REVISION)
}

pub fn third_party_dir(source_root: &Path) -> PathBuf {
    source_root.join(THIRD_PARTY_DIR)
}

/// `<source_root>/third_party/crubit`
pub fn crubit_src_dir(source_root: &Path) -> PathBuf {
    third_party_dir(source_root).join(CRUBIT_DIR_NAME)
}

/// Where the compiler used for the build lives (`bin/clang`).
pub fn llvm_build_dir(source_root: &Path) -> PathBuf {
    third_party_dir(source_root)
        .join("llvm-build")
        .join("Release+Asserts")
}

/// Headers and libraries come from the bootstrap install, which is the only
/// place they are available.
pub fn llvm_bootstrap_install_dir(source_root: &Path) -> PathBuf {
    third_party_dir(source_root).join("llvm-bootstrap-install")
}
