//! # Crubit Builder CLI
//!
//! Binary entry point for `crubit-builder`.
//!
//! Parses command-line arguments with `clap` and hands them to [`cli::Cli`],
//! which checks out Crubit and builds it. Any error from the library surfaces
//! here and becomes a non-zero exit status.

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
