//! Badge stamping command.

use std::path::Path;

use crate::badge::{BadgeConfig, BadgeRenderer};
use crate::config;
use crate::nfo::RatingField;
use crate::processor::{self, ProcessOptions};

/// Flags of the `stamp` subcommand, CLI overrides still unresolved.
pub struct StampArgs<'a> {
    pub path: &'a Path,
    pub recursive: bool,
    pub field: RatingField,
    pub no_fallback: bool,
    pub star_color: Option<&'a str>,
    pub text_color: Option<&'a str>,
    pub opacity: Option<u8>,
    pub scale: Option<f64>,
    pub offset_right: Option<u32>,
    pub offset_bottom: Option<u32>,
    pub square_left: bool,
    pub square_right: bool,
    pub dry_run: bool,
}

/// Place or refresh rating badges under a library root.
pub fn cmd_stamp(args: StampArgs<'_>) -> anyhow::Result<()> {
    super::validate_root(args.path)?;

    // Defaults file first, CLI flags on top
    let mut badge = config::load().badge;
    if let Some(color) = args.star_color {
        badge.star_color = color.to_string();
    }
    if let Some(color) = args.text_color {
        badge.text_color = color.to_string();
    }
    if let Some(opacity) = args.opacity {
        badge.opacity = opacity;
    }
    if let Some(scale) = args.scale {
        badge.scale_percent = scale;
    }
    if let Some(px) = args.offset_right {
        badge.offset_right = px;
    }
    if let Some(px) = args.offset_bottom {
        badge.offset_bottom = px;
    }
    if args.square_left {
        badge.round_left = false;
    }
    if args.square_right {
        badge.round_right = false;
    }

    let renderer = BadgeRenderer::new(BadgeConfig::from_options(&badge)?);
    let opts = ProcessOptions {
        field: args.field,
        allow_fallback: !args.no_fallback,
        dry_run: args.dry_run,
    };

    println!("Stamping covers under {:?}", args.path);
    println!("Rating field: <{}>", args.field);
    if args.dry_run {
        println!("\n[DRY RUN MODE - No files will be written]\n");
    }

    let summary = processor::run_stamp(args.path, args.recursive, &renderer, opts);

    println!(
        "\nDone: {} of {} directories stamped.",
        summary.processed, summary.checked
    );
    println!(
        "Skipped: {} without cover, {} without rating, {} without a safe base, {} failed.",
        summary.no_cover, summary.no_rating, summary.no_safe_base, summary.failed
    );
    Ok(())
}
