//! Cover restore command.

use std::path::Path;

use crate::processor;

/// Restore covers from their newest clean backups.
pub fn cmd_restore(path: &Path, recursive: bool) -> anyhow::Result<()> {
    super::validate_root(path)?;

    println!("Restoring covers under {path:?}");
    let summary = processor::run_restore(path, recursive);

    println!(
        "\nDone: restored {} of {} directories checked.",
        summary.restored, summary.checked
    );
    if summary.no_backup > 0 || summary.failed > 0 {
        println!(
            "Skipped: {} without a clean backup, {} failed.",
            summary.no_backup, summary.failed
        );
    }
    Ok(())
}
