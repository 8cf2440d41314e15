//! # Crubit Builder Library
//!
//! Checks out the Crubit repository (an experiment in Rust/C++ FFI bindings
//! generation) at a pinned revision and builds it with Bazel, using the LLVM
//! toolchain that lives next to it under `third_party/`.
//!
//! Not for production use.
//!
//! ## Quick Example
//!
//! ```no_run
//! use crubit_builder::build::BuildInvoker;
//! use crubit_builder::config::Config;
//! use crubit_builder::process::SystemRunner;
//! use crubit_builder::sync::RepoSynchronizer;
//!
//! let config = Config::for_source_root("/path/to/chromium/src");
//! let runner = SystemRunner;
//!
//! RepoSynchronizer::new(&runner, &config.remote_url)
//!     .synchronize(&config.revision, &config.crubit_dir)?;
//! BuildInvoker::new(&runner, &config).build()?;
//! # Ok::<(), crubit_builder::error::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`, `defaults`)**: paths, the pinned revision and
//!   the Bazel settings, resolved once and passed to each component.
//! - **Synchronization (`sync`)**: reuses a clean working copy in place, or
//!   discards it and clones again.
//! - **Build (`build`)**: runs `bazel build` with the toolchain forced through
//!   `--repo_env`, and always shuts the Bazel server down afterwards.
//! - **Processes (`process`)**: the `CommandRunner` seam every subprocess
//!   goes through.
//!
//! Everything runs sequentially and blocks on each subprocess.

pub mod build;
pub mod config;
pub mod defaults;
pub mod error;
pub mod process;
pub mod revision;
pub mod sync;
