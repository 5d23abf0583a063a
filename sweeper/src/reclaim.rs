use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::error::SweepError;

/// Outcome of one reclamation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Empty owner directories that were removed.
    pub dirs_removed: usize,
    /// Owner directories that could not be listed.
    pub dirs_skipped: usize,
}

/// Remove every owner directory under `root` that has no entries.
///
/// Unlike eviction, a missing or unlistable root is reported to the caller.
/// Per-directory failures are skipped. Emptiness is checked without a lock,
/// so an upload landing between the check and the removal makes
/// `remove_dir` fail; that failure is ignored and the directory is looked at
/// again on the next tick.
pub fn reclaim_empty(root: &Path) -> Result<ReclaimReport, SweepError> {
    let entries = fs::read_dir(root).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SweepError::MissingRoot(root.to_path_buf())
        } else {
            SweepError::ListRoot {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;

    let dirs = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path());
    Ok(reclaim_dirs(dirs))
}

fn reclaim_dirs<I>(dirs: I) -> ReclaimReport
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut report = ReclaimReport::default();
    for dir in dirs {
        match is_dir_empty(&dir) {
            Ok(true) => match fs::remove_dir(&dir) {
                Ok(()) => {
                    report.dirs_removed += 1;
                    debug!(dir = %dir.display(), "reclaimed empty owner directory");
                }
                Err(err) => {
                    debug!(dir = %dir.display(), error = %err, "could not reclaim directory")
                }
            },
            Ok(false) => {}
            Err(err) => {
                report.dirs_skipped += 1;
                warn!(dir = %dir.display(), error = %err, "cannot list owner directory");
            }
        }
    }
    report
}

fn is_dir_empty(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("data");
        let err = reclaim_empty(&root).unwrap_err();
        assert!(matches!(err, SweepError::MissingRoot(p) if p == root));
        assert!(!root.exists());
    }

    #[test]
    fn root_that_is_a_file_is_a_list_error() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("data");
        fs::write(&root, b"not a dir").unwrap();
        assert!(matches!(
            reclaim_empty(&root),
            Err(SweepError::ListRoot { .. })
        ));
    }

    #[test]
    fn removes_only_empty_owner_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let empty = tmp.path().join("owner-empty");
        let full = tmp.path().join("owner-full");
        fs::create_dir(&empty).unwrap();
        fs::create_dir(&full).unwrap();
        fs::write(full.join("cat.png"), b"png").unwrap();

        let report = reclaim_empty(tmp.path()).unwrap();
        assert_eq!(report.dirs_removed, 1);
        assert!(!empty.exists());
        assert!(full.exists());
    }

    #[test]
    fn unlistable_directory_does_not_stop_siblings() {
        let tmp = tempfile::tempdir().unwrap();
        let vanished = tmp.path().join("vanished");
        let empty = tmp.path().join("empty");
        fs::create_dir(&empty).unwrap();

        let report = reclaim_dirs([vanished, empty.clone()]);

        assert_eq!(report.dirs_skipped, 1);
        assert_eq!(report.dirs_removed, 1);
        assert!(!empty.exists());
    }

    #[test]
    fn directory_holding_only_a_subdirectory_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let owner = tmp.path().join("owner");
        fs::create_dir_all(owner.join("nested")).unwrap();
        let report = reclaim_empty(tmp.path()).unwrap();
        assert_eq!(report.dirs_removed, 0);
        assert!(owner.join("nested").exists());
    }

    #[test]
    fn top_level_files_are_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let stray = tmp.path().join("README");
        fs::write(&stray, b"").unwrap();
        reclaim_empty(tmp.path()).unwrap();
        assert!(stray.exists());
    }
}
