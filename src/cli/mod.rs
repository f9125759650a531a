//! Command-line interface for cover-burner.
//!
//! This module provides the non-interactive CLI for stamping rating badges
//! onto covers and restoring the originals from backups.

mod commands;

pub use commands::{Cli, Commands, run_command};
