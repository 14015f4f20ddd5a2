//! Keyword search over file and directory names.
//!
//! A [`KeywordQuery`] matches any walked entry whose basename contains the
//! keyword. Matching is case-insensitive unless asked otherwise, and a
//! keyword ending in `s` also matches its singular form ("backups" finds
//! "backup_01.zip").

use crate::config::{CompiledFilters, SearchDefaults};
use crate::error::{SortError, SortResult};
use crate::walker;
use std::path::{Path, PathBuf};
use tracing::info;

/// A validated keyword search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordQuery {
    keyword: String,
    case_sensitive: bool,
    include_plural: bool,
    needles: Vec<String>,
}

impl KeywordQuery {
    /// # Errors
    ///
    /// `SortError::InvalidArgument` if the keyword is empty or only whitespace.
    pub fn new(keyword: &str, case_sensitive: bool, include_plural: bool) -> SortResult<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SortError::InvalidArgument(
                "keyword cannot be empty".to_string(),
            ));
        }

        let mut needles = vec![keyword.to_string()];
        if include_plural
            && let Some(singular) = keyword.strip_suffix('s')
            && !singular.is_empty()
        {
            needles.push(singular.to_string());
        }
        if !case_sensitive {
            for needle in &mut needles {
                *needle = needle.to_lowercase();
            }
        }
        needles.dedup();

        Ok(Self {
            keyword: keyword.to_string(),
            case_sensitive,
            include_plural,
            needles,
        })
    }

    /// Builds a query using the configured search defaults.
    pub fn with_defaults(keyword: &str, defaults: &SearchDefaults) -> SortResult<Self> {
        Self::new(keyword, defaults.case_sensitive, defaults.include_plural)
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Returns true if `name` contains the keyword or one of its variants.
    pub fn matches(&self, name: &str) -> bool {
        if self.case_sensitive {
            self.needles.iter().any(|needle| name.contains(needle.as_str()))
        } else {
            let name = name.to_lowercase();
            self.needles.iter().any(|needle| name.contains(needle.as_str()))
        }
    }
}

/// Walks `root` and returns every file or directory whose basename matches `query`.
///
/// A directory and entries inside it can both match; callers deleting or
/// moving the result should expect the inner entries to report `NotFound`
/// once their parent has been handled.
///
/// # Errors
///
/// `NotFound` if `root` does not exist.
pub fn search(
    root: &Path,
    query: &KeywordQuery,
    filters: &CompiledFilters,
) -> SortResult<Vec<PathBuf>> {
    let matches: Vec<PathBuf> = walker::walk(root, filters)?
        .into_iter()
        .filter(|entry| {
            entry
                .path
                .file_name()
                .map(|name| query.matches(&name.to_string_lossy()))
                .unwrap_or(false)
        })
        .map(|entry| entry.path)
        .collect();

    info!(
        root = %root.display(),
        keyword = query.keyword(),
        found = matches.len(),
        "keyword search finished"
    );
    Ok(matches)
}
