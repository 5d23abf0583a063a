use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use tracing::{debug, warn};

/// Outcome of one eviction pass over the storage root.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EvictReport {
    /// The root did not exist, so nothing was looked at.
    pub root_missing: bool,
    /// Owner directories walked to completion.
    pub owners_scanned: usize,
    /// Owner directories that could not be listed.
    pub owners_skipped: usize,
    /// Files removed because they outlived the threshold.
    pub files_evicted: usize,
    /// Entries whose metadata could not be read.
    pub files_skipped: usize,
}

/// Returns true when a file last modified at `modified` is strictly older
/// than `ttl` as seen from `now`. A timestamp in the future is never stale.
pub fn is_stale(modified: SystemTime, now: SystemTime, ttl: Duration) -> bool {
    match now.duration_since(modified) {
        Ok(age) => age > ttl,
        Err(_) => false,
    }
}

/// Delete every file under `root/<owner>/` whose modification time is older
/// than `ttl`.
///
/// Best effort: a missing root is a no-op, and failures on one owner
/// directory or one file never stop the rest of the walk. Modification time
/// stands in for last access; the serving path refreshes it on every read.
pub fn evict_stale(root: &Path, ttl: Duration) -> EvictReport {
    let mut report = EvictReport::default();
    match fs::metadata(root) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            report.root_missing = true;
            return report;
        }
        _ => {}
    }

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(root = %root.display(), error = %err, "cannot list storage root");
            return report;
        }
    };

    let owners = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path());
    evict_owners(owners, ttl, &mut report);
    report
}

/// Walk each owner directory in turn; one that cannot be listed is counted
/// and skipped.
fn evict_owners<I>(owners: I, ttl: Duration, report: &mut EvictReport)
where
    I: IntoIterator<Item = PathBuf>,
{
    for owner_dir in owners {
        match evict_owner(&owner_dir, ttl, report) {
            Ok(()) => report.owners_scanned += 1,
            Err(err) => {
                report.owners_skipped += 1;
                warn!(
                    owner = %owner_dir.display(),
                    error = %err,
                    "skipping unreadable owner directory"
                );
            }
        }
    }
}

fn evict_owner(owner_dir: &Path, ttl: Duration, report: &mut EvictReport) -> io::Result<()> {
    for entry in fs::read_dir(owner_dir)? {
        let Ok(entry) = entry else {
            report.files_skipped += 1;
            continue;
        };
        // flat layout: nested directories are neither recursed nor removed
        let meta = match entry.metadata() {
            Ok(meta) if meta.is_dir() => continue,
            Ok(meta) => meta,
            Err(_) => {
                report.files_skipped += 1;
                continue;
            }
        };
        let Ok(modified) = meta.modified() else {
            report.files_skipped += 1;
            continue;
        };
        if !is_stale(modified, SystemTime::now(), ttl) {
            continue;
        }
        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                report.files_evicted += 1;
                debug!(path = %path.display(), "evicted stale file");
            }
            // a concurrent delete already got there
            Err(err) => debug!(path = %path.display(), error = %err, "could not evict file"),
        }
    }
    Ok(())
}
