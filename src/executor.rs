/// Execution of a chosen [`Suggestion`] against a root directory.
///
/// The executor creates each destination subfolder below the root and moves
/// every member path of the matching tag into it. It is best-effort: a path
/// that cannot be moved is recorded in the [`ExecutionReport`] and the run
/// carries on. Runs over the same root are serialized.
use crate::bulk::move_into;
use crate::error::{ItemFailure, SortError, SortResult};
use crate::grouping::Grouping;
use crate::pattern::CategoryTag;
use crate::suggestion::Suggestion;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Condvar, LazyLock, Mutex};
use tracing::{debug, info, warn};

/// Result of executing a suggestion.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExecutionReport {
    /// Destination folders ensured during the run, in structure order.
    pub created_folders: Vec<PathBuf>,
    pub moved_count: usize,
    pub failures: Vec<ItemFailure>,
}

impl ExecutionReport {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A single move the executor would perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub tag: CategoryTag,
    pub source: PathBuf,
    pub destination: PathBuf,
}

static ACTIVE_ROOTS: LazyLock<(Mutex<HashSet<PathBuf>>, Condvar)> =
    LazyLock::new(|| (Mutex::new(HashSet::new()), Condvar::new()));

/// Holds exclusive execution rights on a root until dropped.
struct RootGuard {
    root: PathBuf,
}

impl RootGuard {
    /// Blocks until no other execution holds `root`.
    fn acquire(root: &Path) -> Self {
        let key = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let (lock, released) = &*ACTIVE_ROOTS;
        let mut active = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        while active.contains(&key) {
            active = released
                .wait(active)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        active.insert(key.clone());
        Self { root: key }
    }
}

impl Drop for RootGuard {
    fn drop(&mut self) {
        let (lock, released) = &*ACTIVE_ROOTS;
        let mut active = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        active.remove(&self.root);
        released.notify_all();
    }
}

/// Checks that `subfolder` names a proper directory strictly below the root.
fn validate_subfolder(subfolder: &str) -> SortResult<()> {
    let path = Path::new(subfolder);
    let mut normal_components = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => normal_components += 1,
            Component::CurDir => {}
            _ => {
                return Err(SortError::InvalidArgument(format!(
                    "destination '{}' must stay inside the organized folder",
                    subfolder
                )));
            }
        }
    }
    if normal_components == 0 {
        return Err(SortError::InvalidArgument(format!(
            "destination '{}' resolves to the organized folder itself",
            subfolder
        )));
    }
    Ok(())
}

/// The paths one destination folder receives during a run.
struct FolderWork<'a> {
    tag: &'a CategoryTag,
    folder: PathBuf,
    sources: Vec<&'a PathBuf>,
}

/// Resolves a suggestion into per-folder work, in structure order.
///
/// A path under several tags belongs to the first one only, and a path that
/// already sits in its destination folder is claimed but not listed.
fn folder_work<'a>(
    grouping: &'a Grouping,
    suggestion: &'a Suggestion,
    root: &Path,
) -> SortResult<Vec<FolderWork<'a>>> {
    for subfolder in suggestion.structure.values() {
        validate_subfolder(subfolder)?;
    }

    let mut claimed: HashSet<&PathBuf> = HashSet::new();
    let mut work = Vec::new();
    for (tag, subfolder) in &suggestion.structure {
        let Some(paths) = grouping.get(tag) else {
            debug!(%tag, "tag not present in grouping, skipping");
            continue;
        };

        let folder = root.join(subfolder);
        let sources = paths
            .iter()
            .filter(|path| claimed.insert(*path))
            .filter(|path| path.file_name().is_some())
            .filter(|path| {
                let in_place = path.parent() == Some(folder.as_path());
                if in_place {
                    debug!(path = %path.display(), "already in place");
                }
                !in_place
            })
            .collect();
        work.push(FolderWork {
            tag,
            folder,
            sources,
        });
    }
    Ok(work)
}

/// Runs suggestions against a grouping.
pub struct PlanExecutor;

impl PlanExecutor {
    /// Lists the moves `execute` would make, without touching the filesystem.
    ///
    /// Paths under several tags are listed once, under the first tag in
    /// structure order. Paths already in their destination folder are left out.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if a destination subfolder would resolve to the root
    /// or escape it.
    pub fn plan(
        grouping: &Grouping,
        suggestion: &Suggestion,
        root: &Path,
    ) -> SortResult<Vec<PlannedMove>> {
        let moves = folder_work(grouping, suggestion, root)?
            .into_iter()
            .flat_map(|work| {
                let FolderWork {
                    tag,
                    folder,
                    sources,
                } = work;
                sources.into_iter().filter_map(move |source| {
                    let file_name = source.file_name()?;
                    Some(PlannedMove {
                        tag: tag.clone(),
                        source: source.clone(),
                        destination: folder.join(file_name),
                    })
                })
            })
            .collect();
        Ok(moves)
    }

    /// Executes `suggestion` below `root`.
    ///
    /// # Errors
    ///
    /// `NotFound` if `root` is missing and `InvalidArgument` for a destination
    /// subfolder that would resolve to the root or escape it. Per-file
    /// problems are collected in the report instead.
    pub fn execute(
        grouping: &Grouping,
        suggestion: &Suggestion,
        root: &Path,
    ) -> SortResult<ExecutionReport> {
        Self::execute_with(grouping, suggestion, root, |_| {})
    }

    /// Same as [`PlanExecutor::execute`], calling `on_item` after each attempted move.
    pub fn execute_with<F>(
        grouping: &Grouping,
        suggestion: &Suggestion,
        root: &Path,
        mut on_item: F,
    ) -> SortResult<ExecutionReport>
    where
        F: FnMut(&Path),
    {
        if !root.is_dir() {
            return Err(SortError::NotFound {
                path: root.to_path_buf(),
            });
        }
        let work = folder_work(grouping, suggestion, root)?;

        let _guard = RootGuard::acquire(root);
        info!(root = %root.display(), suggestion = %suggestion.name, "executing suggestion");

        let mut report = ExecutionReport::default();
        for FolderWork {
            tag,
            folder,
            sources,
        } in work
        {
            if let Err(e) = fs::create_dir_all(&folder) {
                warn!(%tag, folder = %folder.display(), error = %e, "could not create destination");
                for path in sources {
                    report.failures.push(ItemFailure::from_io(path, &e));
                    on_item(path);
                }
                continue;
            }
            if !report.created_folders.contains(&folder) {
                report.created_folders.push(folder.clone());
            }

            for path in sources {
                match move_into(path, &folder) {
                    Ok(new_path) => {
                        debug!(from = %path.display(), to = %new_path.display(), "moved");
                        report.moved_count += 1;
                    }
                    Err(failure) => {
                        warn!("{}", failure);
                        report.failures.push(failure);
                    }
                }
                on_item(path);
            }
        }

        info!(
            moved = report.moved_count,
            failed = report.failures.len(),
            "suggestion executed"
        );
        Ok(report)
    }
}
