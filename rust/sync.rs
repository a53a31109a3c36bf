use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::models::DeadlineRecord;

/// Downloads still referenced by the portal: `{dir}/{subject}/{assignment} - {due}.*`.
#[derive(Debug, Default)]
pub struct KeepSet {
    entries: Vec<(String, String)>,
}

impl KeepSet {
    pub fn from_records(records: &[DeadlineRecord]) -> Self {
        let entries = records
            .iter()
            .map(|record| {
                (
                    record.subject.trim().to_string(),
                    format!("{} - {}.", record.assignment.trim(), record.due.trim()),
                )
            })
            .collect();
        Self { entries }
    }

    /// `relative` is the path below the download directory.
    pub fn keeps(&self, relative: &Path) -> bool {
        let mut parts = relative.iter();
        let (Some(subject), Some(file), None) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };
        let (Some(subject), Some(file)) = (subject.to_str(), file.to_str()) else {
            return false;
        };
        self.entries
            .iter()
            .any(|(keep_subject, prefix)| keep_subject == subject && file.starts_with(prefix.as_str()))
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub deleted_files: Vec<PathBuf>,
    pub deleted_dirs: Vec<PathBuf>,
    pub failures: usize,
}

/// Deletes every file under `root` that the keep-set does not cover, then
/// removes directories left empty. `root` itself stays.
pub fn prune_downloads(root: &Path, keep: &KeepSet) -> SyncReport {
    let mut report = SyncReport::default();

    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        match entry {
            Ok(entry) if !entry.file_type().is_dir() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => {
                report.failures += 1;
                tracing::warn!(error = %err, "Failed to walk download directory");
            }
        }
    }

    for path in files {
        let relative = path.strip_prefix(root).unwrap_or(path.as_path());
        if keep.keeps(relative) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted stale file");
                report.deleted_files.push(path);
            }
            Err(err) => {
                report.failures += 1;
                tracing::error!(path = %path.display(), error = %err, "Failed to delete file");
            }
        }
    }

    let dirs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect();

    for dir in dirs {
        let is_empty = fs::read_dir(&dir).map(|mut it| it.next().is_none()).unwrap_or(false);
        if !is_empty {
            continue;
        }
        match fs::remove_dir(&dir) {
            Ok(()) => {
                tracing::debug!(path = %dir.display(), "Deleted empty directory");
                report.deleted_dirs.push(dir);
            }
            Err(err) => {
                report.failures += 1;
                tracing::error!(path = %dir.display(), error = %err, "Failed to delete directory");
            }
        }
    }

    tracing::info!(
        files = report.deleted_files.len(),
        dirs = report.deleted_dirs.len(),
        failures = report.failures,
        "Download directory cleaned"
    );
    report
}
