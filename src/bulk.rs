/// Bulk delete/copy/move over a list of paths.
///
/// Every path is handled independently: a failure is recorded in the
/// [`BulkReport`] and the remaining paths are still processed. Existing
/// destination names are never overwritten.
use crate::error::{FailureKind, ItemFailure, SortError, SortResult};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// What to do with each path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Delete,
    Copy,
    Move,
}

impl Action {
    pub fn needs_destination(&self) -> bool {
        matches!(self, Action::Copy | Action::Move)
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Action::Delete => "Deleted",
            Action::Copy => "Copied",
            Action::Move => "Moved",
        }
    }
}

/// Outcome of a bulk operation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BulkReport {
    pub success_count: usize,
    pub failures: Vec<ItemFailure>,
}

impl BulkReport {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total_processed(&self) -> usize {
        self.success_count + self.failures.len()
    }
}

#[derive(Clone, Copy)]
enum Step<'a> {
    Delete,
    CopyInto(&'a Path),
    MoveInto(&'a Path),
}

/// Runs [`Action`]s over lists of paths.
pub struct BulkOperator;

impl BulkOperator {
    /// Applies `action` to every path.
    ///
    /// For `Copy` and `Move` the destination directory is created if needed and
    /// each item keeps its basename inside it.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when a copy or move has no destination; failure to
    /// create the destination directory aborts before any item is touched.
    pub fn run(
        paths: &[PathBuf],
        action: Action,
        destination: Option<&Path>,
    ) -> SortResult<BulkReport> {
        Self::run_with(paths, action, destination, |_| {})
    }

    /// Same as [`BulkOperator::run`], calling `on_item` after each path is handled.
    pub fn run_with<F>(
        paths: &[PathBuf],
        action: Action,
        destination: Option<&Path>,
        mut on_item: F,
    ) -> SortResult<BulkReport>
    where
        F: FnMut(&Path),
    {
        let step = match (action, destination) {
            (Action::Delete, _) => Step::Delete,
            (_, None) => {
                return Err(SortError::InvalidArgument(format!(
                    "{:?} requires a destination folder",
                    action
                )));
            }
            (Action::Copy, Some(dest)) => Step::CopyInto(dest),
            (Action::Move, Some(dest)) => Step::MoveInto(dest),
        };
        if let Step::CopyInto(dest) | Step::MoveInto(dest) = step {
            fs::create_dir_all(dest).map_err(|e| SortError::from_io(dest, e))?;
        }

        let mut report = BulkReport::default();
        for path in paths {
            let result = match step {
                Step::Delete => delete_path(path),
                Step::CopyInto(dest) => copy_into(path, dest),
                Step::MoveInto(dest) => move_into(path, dest).map(|_| ()),
            };

            match result {
                Ok(()) => {
                    debug!(path = %path.display(), ?action, "bulk item done");
                    report.success_count += 1;
                }
                Err(failure) => {
                    warn!("{}", failure);
                    report.failures.push(failure);
                }
            }
            on_item(path);
        }

        Ok(report)
    }
}

fn delete_path(path: &Path) -> Result<(), ItemFailure> {
    let metadata = fs::symlink_metadata(path).map_err(|e| ItemFailure::from_io(path, &e))?;
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| ItemFailure::from_io(path, &e))
}

/// Destination for `path` inside `dest_dir`, refusing to clobber an existing entry.
fn target_in(path: &Path, dest_dir: &Path) -> Result<PathBuf, ItemFailure> {
    let file_name = path.file_name().ok_or_else(|| {
        ItemFailure::new(path, FailureKind::Other, "path has no name component")
    })?;
    let target = dest_dir.join(file_name);
    if target.exists() {
        return Err(ItemFailure::new(
            path,
            FailureKind::AlreadyExists,
            format!("{} already exists", target.display()),
        ));
    }
    Ok(target)
}

fn copy_into(path: &Path, dest_dir: &Path) -> Result<(), ItemFailure> {
    let metadata = fs::metadata(path).map_err(|e| ItemFailure::from_io(path, &e))?;
    let target = target_in(path, dest_dir)?;
    let result = if metadata.is_dir() {
        copy_tree(path, &target)
    } else {
        fs::copy(path, &target).map(|_| ())
    };
    result.map_err(|e| ItemFailure::from_io(path, &e))
}

/// Moves `path` into `dest_dir`, returning the new location.
///
/// Falls back to copy-then-remove when a rename crosses filesystems. The
/// fallback is not atomic.
pub fn move_into(path: &Path, dest_dir: &Path) -> Result<PathBuf, ItemFailure> {
    fs::symlink_metadata(path).map_err(|e| ItemFailure::from_io(path, &e))?;
    let target = target_in(path, dest_dir)?;

    match fs::rename(path, &target) {
        Ok(()) => Ok(target),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(path = %path.display(), "rename crosses devices, copying instead");
            move_by_copy(path, &target).map_err(|e| ItemFailure::from_io(path, &e))?;
            Ok(target)
        }
        Err(e) => Err(ItemFailure::from_io(path, &e)),
    }
}

fn move_by_copy(path: &Path, target: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        copy_tree(path, target)?;
        fs::remove_dir_all(path)
    } else {
        fs::copy(path, target)?;
        fs::remove_file(path)
    }
}

fn copy_tree(source: &Path, target: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let dest = target.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}
