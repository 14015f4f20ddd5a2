//! Stale file detection by last-access time.
//!
//! An item is stale when its last-access time is strictly older than
//! `now - days * 86400s`. Directories are judged by their *own* access time:
//! a directory touched recently is kept even if everything inside it is
//! stale, and a stale directory is reported even if it holds fresh files.
//! This shallow policy is intentional and matches what `stat` reports.

use crate::config::CompiledFilters;
use crate::error::{FailureKind, ItemFailure, SortError, SortResult};
use crate::walker::{self, FileStat};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SECONDS_PER_DAY: i64 = 86_400;

/// A stale-scan candidate with derived age information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgedItem {
    pub path: PathBuf,
    pub last_access_time: DateTime<Utc>,
    /// Days since last access, rounded to one decimal.
    pub days_since_access: f64,
    pub is_directory: bool,
}

impl AgedItem {
    pub fn from_stat(stat: &FileStat, now: DateTime<Utc>) -> Self {
        let elapsed = (now - stat.last_access).num_seconds() as f64 / SECONDS_PER_DAY as f64;
        Self {
            path: stat.path.clone(),
            last_access_time: stat.last_access,
            days_since_access: (elapsed * 10.0).round() / 10.0,
            is_directory: stat.is_directory,
        }
    }
}

/// Validates a day count, returning the cutoff instant.
fn cutoff_for(cutoff_days: i64, now: DateTime<Utc>) -> SortResult<DateTime<Utc>> {
    if cutoff_days <= 0 {
        return Err(SortError::InvalidArgument(format!(
            "days must be greater than 0, got {}",
            cutoff_days
        )));
    }
    let out_of_range =
        || SortError::InvalidArgument(format!("{} days is out of range", cutoff_days));
    let span = cutoff_days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(Duration::try_seconds)
        .ok_or_else(out_of_range)?;
    now.checked_sub_signed(span).ok_or_else(out_of_range)
}

/// Returns the paths of `items` last accessed strictly before `now - cutoff_days`.
///
/// Input order is preserved.
///
/// # Errors
///
/// `SortError::InvalidArgument` if `cutoff_days` is zero or negative.
pub fn filter_stale(
    items: &[FileStat],
    cutoff_days: i64,
    now: DateTime<Utc>,
) -> SortResult<Vec<PathBuf>> {
    let cutoff = cutoff_for(cutoff_days, now)?;
    Ok(items
        .iter()
        .filter(|item| item.last_access < cutoff)
        .map(|item| item.path.clone())
        .collect())
}

/// Outcome of [`find_stale`].
#[derive(Debug, Clone, Serialize)]
pub struct StaleScan {
    pub root: PathBuf,
    pub cutoff_days: i64,
    /// Stale items in walk order.
    pub items: Vec<AgedItem>,
    /// Paths whose metadata could not be read.
    pub skipped: Vec<ItemFailure>,
}

impl StaleScan {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.items.iter().map(|item| item.path.clone()).collect()
    }
}

/// Walks `root` and collects every file and directory not accessed for `cutoff_days`.
///
/// The day count is validated before the tree is touched. Entries whose
/// metadata cannot be read are recorded in `skipped`.
///
/// # Errors
///
/// `InvalidArgument` for a non-positive day count, `NotFound` for a missing
/// root, `EmptyResult` when the walk yields nothing.
pub fn find_stale(
    root: &Path,
    cutoff_days: i64,
    filters: &CompiledFilters,
) -> SortResult<StaleScan> {
    let now = Utc::now();
    cutoff_for(cutoff_days, now)?;

    let entries = walker::walk(root, filters)?;
    if entries.is_empty() {
        return Err(SortError::EmptyResult {
            root: root.to_path_buf(),
        });
    }

    let mut stats = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();
    for entry in &entries {
        match walker::stat(&entry.path) {
            Ok(stat) => stats.push(stat),
            Err(e) => {
                debug!(path = %entry.path.display(), error = %e, "stat failed, skipping");
                let kind = match &e {
                    SortError::NotFound { .. } => FailureKind::NotFound,
                    SortError::AccessDenied { .. } => FailureKind::AccessDenied,
                    _ => FailureKind::Other,
                };
                skipped.push(ItemFailure::new(&entry.path, kind, e.to_string()));
            }
        }
    }

    let stale: HashSet<PathBuf> =
        filter_stale(&stats, cutoff_days, now)?.into_iter().collect();
    let items: Vec<AgedItem> = stats
        .iter()
        .filter(|stat| stale.contains(&stat.path))
        .map(|stat| AgedItem::from_stat(stat, now))
        .collect();

    info!(
        root = %root.display(),
        scanned = stats.len(),
        stale = items.len(),
        "stale scan finished"
    );

    Ok(StaleScan {
        root: root.to_path_buf(),
        cutoff_days,
        items,
        skipped,
    })
}
