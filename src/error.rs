//! # Error Handling
//!
//! Centralized error type for `crubit-builder`. The library reports every
//! failure through [`Error`]; the binary wraps it in `anyhow` at the top level
//! and turns it into a non-zero exit status.
//!
//! Only two kinds are fatal by design of the tool:
//!
//! - [`Error::Synchronization`]: the working copy could not be brought to the
//!   pinned revision, even after discarding and re-cloning it.
//! - [`Error::Build`]: the build tool exited unsuccessfully.
//!
//! The remaining variants cover the plumbing around them (spawning processes,
//! loading configuration, filesystem access).

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Main error type for crubit-builder operations
#[derive(Error, Debug)]
pub enum Error {
    /// The working copy could not be synchronized to the target revision.
    #[error("Failed to check out {revision} into {}: {message}", path.display())]
    Synchronization {
        revision: String,
        path: PathBuf,
        message: String,
    },

    /// The build tool returned a non-zero exit status.
    #[error("Build of {target} failed ({status})")]
    Build { target: String, status: ExitStatus },

    /// A subprocess could not be started at all.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A revision string could not be parsed.
    #[error("Invalid revision '{value}': {message}")]
    InvalidRevision { value: String, message: String },

    /// The configuration is unusable.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
