//! Walk → group → synthesize, bundled into one immutable [`Analysis`].
//!
//! An analysis is a snapshot of one walk. Once the tree changes (for example
//! after a suggestion has been applied) it must be recomputed, never updated.

use crate::config::CompiledFilters;
use crate::error::{SortError, SortResult};
use crate::executor::{ExecutionReport, PlanExecutor, PlannedMove};
use crate::grouping::Grouping;
use crate::suggestion::{Suggestion, synthesize};
use crate::walker;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use tracing::info;

/// Grouping and suggestions computed from one walk of `root`.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub root: PathBuf,
    /// Number of files seen by the walk.
    pub file_count: usize,
    pub grouping: Grouping,
    pub suggestions: Vec<Suggestion>,
}

impl Analysis {
    /// Walks `root`, groups its files and synthesizes suggestions.
    ///
    /// Only regular files are classified; directories are walked through.
    ///
    /// # Errors
    ///
    /// `NotFound` if `root` does not exist and `EmptyResult` if the walk finds
    /// no files at all.
    pub fn run(root: &Path, filters: &CompiledFilters) -> SortResult<Self> {
        let files: Vec<PathBuf> = walker::walk(root, filters)?
            .into_iter()
            .filter(|entry| !entry.is_dir)
            .map(|entry| entry.path)
            .collect();

        if files.is_empty() {
            return Err(SortError::EmptyResult {
                root: root.to_path_buf(),
            });
        }

        Ok(Self::from_paths(root, &files))
    }

    /// Builds an analysis from an already collected path list.
    pub fn from_paths(root: &Path, files: &[PathBuf]) -> Self {
        let grouping = Grouping::from_paths(files);
        let suggestions = synthesize(&grouping);
        info!(
            root = %root.display(),
            files = files.len(),
            groups = grouping.len(),
            suggestions = suggestions.len(),
            "analysis finished"
        );

        Self {
            root: root.to_path_buf(),
            file_count: files.len(),
            grouping,
            suggestions,
        }
    }

    /// Suggestion at `index` (0-based).
    pub fn suggestion(&self, index: usize) -> Option<&Suggestion> {
        self.suggestions.get(index)
    }

    fn require_suggestion(&self, index: usize) -> SortResult<&Suggestion> {
        self.suggestion(index).ok_or_else(|| {
            SortError::InvalidArgument(format!(
                "suggestion {} does not exist ({} available)",
                index + 1,
                self.suggestions.len()
            ))
        })
    }

    /// Moves that applying suggestion `index` would make.
    pub fn preview(&self, index: usize) -> SortResult<Vec<PlannedMove>> {
        PlanExecutor::plan(&self.grouping, self.require_suggestion(index)?, &self.root)
    }

    /// Applies suggestion `index` to the analyzed root.
    ///
    /// Consumes the analysis: after files have moved its grouping is stale.
    pub fn apply(self, index: usize) -> SortResult<ExecutionReport> {
        self.apply_with(index, |_| {})
    }

    /// Same as [`Analysis::apply`], reporting progress per attempted move.
    pub fn apply_with<F>(self, index: usize, on_item: F) -> SortResult<ExecutionReport>
    where
        F: FnMut(&Path),
    {
        let suggestion = self.require_suggestion(index)?;
        PlanExecutor::execute_with(&self.grouping, suggestion, &self.root, on_item)
    }
}

/// Runs [`Analysis::run`] on a worker thread.
///
/// The receiver yields exactly one result once the walk and classification
/// are done.
pub fn spawn(root: PathBuf, filters: CompiledFilters) -> Receiver<SortResult<Analysis>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let result = Analysis::run(&root, &filters);
        // The caller may have stopped listening; nothing left to do then.
        let _ = sender.send(result);
    });
    receiver
}
