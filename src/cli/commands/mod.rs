//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `stamp`: place or refresh rating badges on covers
//! - `restore`: put the original artwork back from clean backups

mod restore;
mod stamp;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::nfo::RatingField;

pub use restore::cmd_restore;
pub use stamp::cmd_stamp;

/// Cover Burner CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Place or refresh rating badges on covers (folder.jpg)
    Stamp {
        /// Root directory of the media library
        path: PathBuf,
        /// Process subdirectories recursively
        #[arg(short, long)]
        recursive: bool,
        /// NFO field to read the rating from
        #[arg(long, value_enum, default_value = "rating")]
        field: RatingField,
        /// Do not fall back to the other rating field
        #[arg(long)]
        no_fallback: bool,
        /// Star color (#RRGGBB)
        #[arg(long)]
        star_color: Option<String>,
        /// Rating text color (#RRGGBB)
        #[arg(long)]
        text_color: Option<String>,
        /// Badge background alpha (0 = transparent, 255 = opaque)
        #[arg(long)]
        opacity: Option<u8>,
        /// Badge size scale in percent (10-400)
        #[arg(long)]
        scale: Option<f64>,
        /// Distance from the right image edge in px
        #[arg(long)]
        offset_right: Option<u32>,
        /// Distance from the bottom image edge in px
        #[arg(long)]
        offset_bottom: Option<u32>,
        /// Keep the left badge corners square
        #[arg(long)]
        square_left: bool,
        /// Keep the right badge corners square
        #[arg(long)]
        square_right: bool,
        /// Report what would be stamped without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Restore covers from the newest clean backup (removes the badge)
    Restore {
        /// Root directory of the media library
        path: PathBuf,
        /// Process subdirectories recursively
        #[arg(short, long)]
        recursive: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Stamp {
            path,
            recursive,
            field,
            no_fallback,
            star_color,
            text_color,
            opacity,
            scale,
            offset_right,
            offset_bottom,
            square_left,
            square_right,
            dry_run,
        } => cmd_stamp(stamp::StampArgs {
            path,
            recursive: *recursive,
            field: *field,
            no_fallback: *no_fallback,
            star_color: star_color.as_deref(),
            text_color: text_color.as_deref(),
            opacity: *opacity,
            scale: *scale,
            offset_right: *offset_right,
            offset_bottom: *offset_bottom,
            square_left: *square_left,
            square_right: *square_right,
            dry_run: *dry_run,
        }),
        Commands::Restore { path, recursive } => cmd_restore(path, *recursive),
    }
}

/// Reject unusable root paths before any traversal starts.
pub(crate) fn validate_root(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("root path does not exist: {}", path.display());
    }
    if !path.is_dir() {
        anyhow::bail!("root path is not a directory: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_root_rejects_missing_path() {
        assert!(validate_root(Path::new("/definitely/not/here")).is_err());
    }

    #[test]
    fn test_validate_root_rejects_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("cover.jpg");
        std::fs::write(&file, b"x").unwrap();
        assert!(validate_root(&file).is_err());
        assert!(validate_root(tmp.path()).is_ok());
    }

    #[test]
    fn test_cli_parses_stamp_flags() {
        use clap::Parser;
        let cli = Cli::parse_from([
            "cover-burner",
            "stamp",
            "/library",
            "--recursive",
            "--field",
            "criticrating",
            "--scale",
            "150",
            "--square-left",
        ]);
        match cli.command {
            Commands::Stamp {
                recursive,
                field,
                scale,
                square_left,
                square_right,
                ..
            } => {
                assert!(recursive);
                assert_eq!(field, RatingField::CriticRating);
                assert_eq!(scale, Some(150.0));
                assert!(square_left);
                assert!(!square_right);
            }
            _ => panic!("expected stamp command"),
        }
    }
}
