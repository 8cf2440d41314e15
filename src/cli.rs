//! CLI argument parsing and run orchestration

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use log::{debug, info, LevelFilter};

use crubit_builder::build::BuildInvoker;
use crubit_builder::config::{Config, ConfigFile};
use crubit_builder::process::SystemRunner;
use crubit_builder::revision::TargetRevision;
use crubit_builder::sync::RepoSynchronizer;

/// Build and package Crubit tools
///
/// Clones Crubit at a pinned revision into third_party/crubit and builds it
/// with Bazel using the LLVM toolchain from third_party/.
#[derive(Parser, Debug)]
#[command(name = "crubit-builder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Run subcommands with verbosity (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Skip Crubit git checkout. Useful for trying local changes
    #[arg(long)]
    skip_checkout: bool,

    /// Path to a TOML config file
    #[arg(long, value_name = "PATH", env = "CRUBIT_BUILDER_CONFIG")]
    config: Option<PathBuf>,

    /// Checkout root containing third_party/ (defaults to current directory)
    #[arg(long, value_name = "PATH", env = "CRUBIT_BUILDER_SOURCE_ROOT")]
    source_root: Option<PathBuf>,

    /// Bazel executable to run
    #[arg(long, value_name = "PROGRAM", env = "CRUBIT_BUILDER_BAZEL")]
    bazel: Option<String>,

    /// Crubit revision to check out, as COMMIT or COMMIT-SUBREVISION
    #[arg(long, value_name = "REVISION")]
    revision: Option<TargetRevision>,

    /// Extra arguments; accepted and ignored
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    rest: Vec<String>,
}

impl Cli {
    /// Synchronize the working copy (unless skipped), then build.
    pub fn execute(self) -> Result<()> {
        init_logging(self.verbose);

        if !self.rest.is_empty() {
            debug!("Ignoring extra arguments: {:?}", self.rest);
        }

        let config = self.load_config()?;
        config.validate()?;
        debug!("Using configuration: {:?}", config);

        let runner = SystemRunner;

        if self.skip_checkout {
            info!("Skipping checkout of {}", config.crubit_dir.display());
        } else {
            RepoSynchronizer::new(&runner, &config.remote_url)
                .synchronize(&config.revision, &config.crubit_dir)?;
        }

        if !config.crubit_dir.is_dir() {
            bail!(
                "Crubit working copy not found at {}",
                config.crubit_dir.display()
            );
        }

        BuildInvoker::new(&runner, &config).build()?;
        info!("Crubit {} built", config.revision.package_version());
        Ok(())
    }

    fn load_config(&self) -> Result<Config> {
        let file = match &self.config {
            Some(path) => Some(
                ConfigFile::from_path(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
            ),
            None => None,
        };
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let mut config = Config::resolve(file, self.source_root.clone(), &cwd);
        if let Some(bazel) = &self.bazel {
            config.bazel.program = bazel.clone();
        }
        if let Some(revision) = &self.revision {
            config.revision = revision.clone();
        }
        Ok(config)
    }
}

/// `-v` maps to debug, `-vv` and beyond to trace. `RUST_LOG` refines it.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // A second init (tests) is harmless.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
