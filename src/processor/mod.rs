//! Per-directory orchestration of the badge pipeline.
//!
//! Each title directory moves through a small state machine: locate the
//! cover, locate a rating, refresh the backup lineage, pick a safe base,
//! render, stamp, save. Directory-level functions raise the error kind
//! describing why they stopped; the run loop catches every error at the
//! directory boundary and downgrades it to a skip outcome, so sibling
//! directories keep processing.
//!
//! Directories are processed sequentially and independently: the only
//! state shared across them is the read-only renderer built once per run.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::badge::BadgeRenderer;
use crate::cover::{self, backup};
use crate::error::{Error, Result, ResultExt};
use crate::nfo::{self, RatingField};

/// Per-run processing options.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions {
    /// Rating field consulted first
    pub field: RatingField,
    /// Consult the other recognized field when the preferred one is empty
    pub allow_fallback: bool,
    /// Report decisions without writing anything
    pub dry_run: bool,
}

/// Why a directory was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No live cover file
    NoCover,
    /// No NFO yielded a usable rating
    NoRating,
    /// Cover is stamped and no clean backup exists
    NoSafeBase,
    /// No clean backup to restore from
    NoBackup,
    /// Unexpected per-directory failure, already logged
    Failed,
}

/// Terminal state of one directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Badge rendered, stamped and saved (or would be, in a dry run)
    Processed,
    /// Cover restored from the newest clean backup
    Restored,
    Skipped(SkipReason),
}

/// Tally of a whole run, reported to the user at the end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub checked: usize,
    pub processed: usize,
    pub restored: usize,
    pub no_cover: usize,
    pub no_rating: usize,
    pub no_safe_base: usize,
    pub no_backup: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: Outcome) {
        self.checked += 1;
        match outcome {
            Outcome::Processed => self.processed += 1,
            Outcome::Restored => self.restored += 1,
            Outcome::Skipped(SkipReason::NoCover) => self.no_cover += 1,
            Outcome::Skipped(SkipReason::NoRating) => self.no_rating += 1,
            Outcome::Skipped(SkipReason::NoSafeBase) => self.no_safe_base += 1,
            Outcome::Skipped(SkipReason::NoBackup) => self.no_backup += 1,
            Outcome::Skipped(SkipReason::Failed) => self.failed += 1,
        }
    }
}

/// Stamp every directory under `root`.
pub fn run_stamp(
    root: &Path,
    recursive: bool,
    renderer: &BadgeRenderer,
    opts: ProcessOptions,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for dir in target_dirs(root, recursive) {
        let outcome = match process_dir(&dir, renderer, opts) {
            Ok(()) => Outcome::Processed,
            Err(e) => skip_outcome(&dir, e),
        };
        summary.record(outcome);
    }
    summary
}

/// Restore every directory under `root` from its newest clean backup.
pub fn run_restore(root: &Path, recursive: bool) -> RunSummary {
    let mut summary = RunSummary::default();
    for dir in target_dirs(root, recursive) {
        let outcome = match restore_dir(&dir) {
            Ok(()) => Outcome::Restored,
            Err(e) => skip_outcome(&dir, e),
        };
        summary.record(outcome);
    }
    summary
}

/// Downgrade a directory-level error to its skip outcome. The expected
/// error kinds map to a named reason; anything else is an unexpected
/// failure and gets logged.
fn skip_outcome(dir: &Path, error: Error) -> Outcome {
    let reason = match &error {
        Error::MissingCover(_) => SkipReason::NoCover,
        Error::NoRatingFound(_) => SkipReason::NoRating,
        Error::UnsafeBaseUnavailable(_) => SkipReason::NoSafeBase,
        Error::NoCleanBackup(_) => SkipReason::NoBackup,
        _ => {
            tracing::error!(dir = %dir.display(), %error, "directory failed, skipping");
            return Outcome::Skipped(SkipReason::Failed);
        }
    };
    tracing::debug!(dir = %dir.display(), %error, "skipping directory");
    Outcome::Skipped(reason)
}

/// Directories to visit: the root itself, plus the whole subtree when
/// recursive. No visit order is promised across directories.
fn target_dirs(root: &Path, recursive: bool) -> Vec<PathBuf> {
    if !recursive {
        return vec![root.to_path_buf()];
    }
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Run one directory through the stamping state machine.
pub fn process_dir(dir: &Path, renderer: &BadgeRenderer, opts: ProcessOptions) -> Result<()> {
    let cover = cover::cover_path(dir);
    if !cover.is_file() {
        return Err(Error::MissingCover(dir.to_path_buf()));
    }

    let Some((nfo_path, rating)) = nfo::find_rating_in_dir(dir, opts.field, opts.allow_fallback)
    else {
        return Err(Error::NoRatingFound(dir.to_path_buf()));
    };
    let rating_text = rating.display_value();

    if rating.fallback {
        tracing::warn!(
            dir = %dir.display(),
            preferred = %opts.field,
            used = %rating.field,
            "preferred rating field missing, used fallback"
        );
    }

    if opts.dry_run {
        // Report the decision without touching the lineage
        let base_available = backup::newest_clean_backup(dir).is_some()
            || !cover::marker::has_marker(&cover);
        if !base_available {
            return Err(Error::UnsafeBaseUnavailable(dir.to_path_buf()));
        }
        tracing::info!(
            dir = %dir.display(),
            nfo = %nfo_path.display(),
            rating = %rating_text,
            "would stamp"
        );
        return Ok(());
    }

    // Backup bookkeeping must come before any destructive write
    backup::refresh_if_changed(dir, &cover)?;

    let Some(base) = backup::pick_base_for_render(dir, &cover)? else {
        tracing::warn!(
            dir = %dir.display(),
            "cover is stamped and no clean backup exists, refusing to stamp a stamp"
        );
        return Err(Error::UnsafeBaseUnavailable(dir.to_path_buf()));
    };

    tracing::info!(
        dir = %dir.display(),
        nfo = %nfo_path.display(),
        field = %rating.field,
        rating = %rating_text,
        base = %base.display(),
        "stamping cover"
    );

    let base_img = cover::open_fit(&base)?;
    let stamped = renderer.render(&base_img, &rating_text);
    let provenance = format!("field={};rating={}", rating.field, rating_text);
    cover::save_stamped(&stamped, &cover, &provenance)?;

    Ok(())
}

/// Restore the live cover from the newest clean backup, verbatim.
pub fn restore_dir(dir: &Path) -> Result<()> {
    let cover = cover::cover_path(dir);
    if !cover.is_file() {
        return Err(Error::MissingCover(dir.to_path_buf()));
    }
    let Some(backup) = backup::newest_clean_backup(dir) else {
        return Err(Error::NoCleanBackup(dir.to_path_buf()));
    };

    fs::copy(&backup, &cover)
        .with_context(format!("restoring {} from backup", cover.display()))?;
    tracing::info!(
        dir = %dir.display(),
        backup = %backup.display(),
        "restored cover from backup"
    );
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
