//! Directory traversal and metadata access.
//!
//! These are the only places the analysis pipeline touches the filesystem
//! before a plan is executed. Everything downstream works on the plain
//! in-memory values produced here.

use crate::config::CompiledFilters;
use crate::error::{SortError, SortResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One entry yielded by [`walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Last-access metadata for a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub path: PathBuf,
    pub last_access: DateTime<Utc>,
    pub is_directory: bool,
}

/// Recursively lists every file and directory below `root` (the root itself excluded).
///
/// Entries are visited depth-first with siblings sorted by name, so repeated
/// walks of an unchanged tree produce the same sequence. Filters are matched
/// against paths relative to `root`; an excluded directory is pruned together
/// with its contents. Entries that cannot be read are logged and skipped.
///
/// # Errors
///
/// Returns `SortError::NotFound` if `root` does not exist and
/// `SortError::InvalidArgument` if it is not a directory.
pub fn walk(root: &Path, filters: &CompiledFilters) -> SortResult<Vec<WalkEntry>> {
    let metadata = fs::metadata(root).map_err(|e| SortError::from_io(root, e))?;
    if !metadata.is_dir() {
        return Err(SortError::InvalidArgument(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut entries = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            filters.should_include(rel)
        });

    for entry in walker {
        match entry {
            Ok(entry) => entries.push(WalkEntry {
                path: entry.path().to_path_buf(),
                is_dir: entry.file_type().is_dir(),
            }),
            Err(e) => warn!("Skipping unreadable entry: {}", e),
        }
    }

    debug!(root = %root.display(), count = entries.len(), "walk finished");
    Ok(entries)
}

/// Reads the last-access time and type of `path`.
///
/// Symlinks are not followed.
///
/// # Errors
///
/// `SortError::NotFound` or `SortError::AccessDenied` for the usual cases;
/// callers working on a batch should skip the path rather than abort.
pub fn stat(path: &Path) -> SortResult<FileStat> {
    let metadata = fs::symlink_metadata(path).map_err(|e| SortError::from_io(path, e))?;
    let accessed = metadata
        .accessed()
        .map_err(|e| SortError::from_io(path, e))?;

    Ok(FileStat {
        path: path.to_path_buf(),
        last_access: DateTime::<Utc>::from(accessed),
        is_directory: metadata.is_dir(),
    })
}
