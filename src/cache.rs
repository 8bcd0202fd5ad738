//! Staging-directory eviction.
//!
//! The staging directory accumulates images fetched from remote sources.
//! After each rotation cycle it is reconciled back under a configured entry
//! count, deleting the oldest files first while never touching an image that
//! is currently on a display.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::error::Result;

/// Bound the entry count of `cache_dir`, protecting `protected` paths.
///
/// Entries are removed oldest-modification-first until the count is within
/// `max_count` or only protected entries remain. A missing directory is
/// treated as already empty.
pub fn reconcile(cache_dir: &Path, max_count: usize, protected: &HashSet<PathBuf>) -> Result<()> {
    if !cache_dir.exists() {
        return Ok(());
    }

    let mut entries: Vec<(PathBuf, SystemTime)> = Vec::new();
    for entry in fs::read_dir(cache_dir)? {
        let entry = entry?;
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        entries.push((entry.path(), modified));
    }

    if entries.len() <= max_count {
        return Ok(());
    }

    entries.sort_by_key(|(_, modified)| *modified);

    let mut to_remove = entries.len() - max_count;
    for (path, _) in entries {
        if to_remove == 0 {
            break;
        }
        if protected.contains(&path) {
            debug!(path = %path.display(), "skipping in-use cache entry");
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "evicted cache entry");
                to_remove -= 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to evict cache entry");
            }
        }
    }

    Ok(())
}
