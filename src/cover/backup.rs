//! Versioned lineage of clean cover backups.
//!
//! Each title directory keeps its own backup lineage under a reserved
//! naming scheme: the first-ever backup (the original artwork) takes the
//! bare prefix, later snapshots append a sortable timestamp. A backup is
//! only ever taken from an unmarked cover, so restoring the newest clean
//! backup always yields badge-free artwork.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{marker, similarity};
use crate::error::{Result, ResultExt};

/// Reserved file-name prefix for backups.
pub const BACKUP_PREFIX: &str = "folder_backup";

/// All backup-named files in a directory, lexicographically ordered.
fn backup_candidates(dir: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(BACKUP_PREFIX) && n.ends_with(".jpg"))
        })
        .collect();
    out.sort();
    out
}

/// The most recently modified backup without a marker, or none.
pub fn newest_clean_backup(dir: &Path) -> Option<PathBuf> {
    backup_candidates(dir)
        .into_iter()
        .filter(|p| !marker::has_marker(p))
        .max_by_key(|p| {
            fs::metadata(p)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH)
        })
}

/// Name for a new timestamped snapshot, collision-free at second
/// resolution within a run.
fn timestamped_backup_name(dir: &Path) -> PathBuf {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("{BACKUP_PREFIX}_{ts}.jpg"))
}

/// Snapshot the live cover into the backup lineage.
///
/// Refuses (returns `Ok(None)`, creates nothing) when the cover is missing
/// or already stamped: a backup taken from a stamped cover would poison the
/// restore path. The first backup takes the primary name; later ones get a
/// timestamped name.
pub fn create_backup_from_current(dir: &Path, cover: &Path) -> Result<Option<PathBuf>> {
    if !cover.is_file() || marker::has_marker(cover) {
        return Ok(None);
    }

    let primary = dir.join(format!("{BACKUP_PREFIX}.jpg"));
    let target = if primary.exists() {
        timestamped_backup_name(dir)
    } else {
        primary
    };

    fs::copy(cover, &target).with_context(format!("backing up {}", cover.display()))?;
    tracing::info!(
        dir = %dir.display(),
        backup = %target.display(),
        "backed up clean cover"
    );
    Ok(Some(target))
}

/// Refresh the lineage when the live cover was replaced outside the
/// pipeline.
///
/// For an unstamped cover: creates the first backup unconditionally, or a
/// new snapshot when the cover differs very much from the newest clean
/// backup. Returns the created backup path, if any.
pub fn refresh_if_changed(dir: &Path, cover: &Path) -> Result<Option<PathBuf>> {
    if !cover.is_file() || marker::has_marker(cover) {
        return Ok(None);
    }

    let Some(backup) = newest_clean_backup(dir) else {
        return create_backup_from_current(dir, cover);
    };

    if similarity::very_different(cover, &backup) {
        tracing::warn!(
            dir = %dir.display(),
            backup = %backup.display(),
            "live cover differs strongly from newest backup, snapshotting new original"
        );
        return create_backup_from_current(dir, cover);
    }

    Ok(None)
}

/// Choose the clean base image to render the badge onto.
///
/// Prefers the newest clean backup. Failing that, an unstamped live cover
/// is backed up and the backup used (or the cover itself if the backup
/// could not be created). A stamped cover with no clean backup yields
/// none: there is no safe base, and stamping a stamp is never allowed.
pub fn pick_base_for_render(dir: &Path, cover: &Path) -> Result<Option<PathBuf>> {
    if let Some(backup) = newest_clean_backup(dir) {
        return Ok(Some(backup));
    }
    if cover.is_file() && !marker::has_marker(cover) {
        let created = create_backup_from_current(dir, cover)?;
        return Ok(Some(created.unwrap_or_else(|| cover.to_path_buf())));
    }
    Ok(None)
}
