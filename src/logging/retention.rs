//! Archive retention management
//!
//! Handles cleanup of old rollover archives by count.

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::Result;

use super::rollover::is_archive_of;
use super::target::LogTarget;

/// List the archives of `target`, oldest first
pub fn list_archives(target: &LogTarget) -> Result<Vec<PathBuf>> {
    if !target.directory.exists() {
        return Ok(Vec::new());
    }

    let mut archives: Vec<(SystemTime, String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(&target.directory)? {
        let entry = entry?;
        let path = entry.path();

        // Only process archives of this log
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if is_archive_of(target, name) => name.to_string(),
            _ => continue,
        };

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        archives.push((modified, name, path));
    }

    archives.sort();
    Ok(archives.into_iter().map(|(_, _, path)| path).collect())
}

/// Delete the oldest archives of `target` so at most `keep` remain
///
/// Returns the number of files deleted.
pub fn prune_archives(target: &LogTarget, keep: usize) -> Result<usize> {
    let archives = list_archives(target)?;
    if archives.len() <= keep {
        return Ok(0);
    }

    let excess = archives.len() - keep;
    let mut deleted_count = 0;
    for path in archives.into_iter().take(excess) {
        match fs::remove_file(&path) {
            Ok(()) => deleted_count += 1,
            Err(e) => tracing::warn!("Failed to remove archive {}: {}", path.display(), e),
        }
    }

    Ok(deleted_count)
}
