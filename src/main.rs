//! Cover Burner - burns NFO ratings onto media library cover art.
//!
//! Walks a media library (one directory per title), reads a rating from
//! each title's NFO file and composites a star badge onto the cover image.
//! Every stamp is reversible: clean originals are kept in a per-directory
//! backup lineage and an embedded marker keeps repeated runs from stacking
//! badges on top of each other.

pub mod badge;
pub mod cli;
pub mod config;
pub mod cover;
pub mod error;
pub mod nfo;
pub mod processor;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("cover_burner=info".parse()?))
        .init();

    cli::run_command(&args)
}
