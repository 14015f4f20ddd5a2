//! Filename pattern matching.
//!
//! Turns a bare filename into the set of [`CategoryTag`]s it belongs to. Tags
//! are additive: a single name can carry an extension, a prefix, a date and a
//! version tag at the same time, or none of them.
//!
//! # Examples
//!
//! ```
//! use smartsort::pattern::{classify, CategoryTag};
//!
//! let tags = classify("report_2024-01-05_v2.pdf");
//! assert!(tags.contains(&CategoryTag::Extension(".pdf".to_string())));
//! assert!(tags.contains(&CategoryTag::Prefix("report".to_string())));
//! assert!(tags.contains(&CategoryTag::Date));
//! assert!(tags.contains(&CategoryTag::Version));
//!
//! assert!(classify("notes").is_empty());
//! ```

use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_\-\s]+").unwrap());
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}[-_]?[0-9]{2}[-_]?[0-9]{2}").unwrap());
static VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)v[0-9]+").unwrap());

/// A classification axis plus its value.
///
/// Variant order is chosen so the derived `Ord` matches the lexical order of
/// the rendered keys (`date` < `extension:*` < `prefix:*` < `version`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryTag {
    /// The name contains a `YYYY[-_]MM[-_]DD` shaped date.
    Date,
    /// Lowercased extension including the leading dot, e.g. `.pdf`.
    Extension(String),
    /// First token of the name, case preserved.
    Prefix(String),
    /// The name contains `v<digits>`.
    Version,
}

impl CategoryTag {
    pub fn is_extension(&self) -> bool {
        matches!(self, CategoryTag::Extension(_))
    }

    pub fn is_prefix(&self) -> bool {
        matches!(self, CategoryTag::Prefix(_))
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryTag::Date => f.write_str("date"),
            CategoryTag::Extension(ext) => write!(f, "extension:{}", ext),
            CategoryTag::Prefix(prefix) => write!(f, "prefix:{}", prefix),
            CategoryTag::Version => f.write_str("version"),
        }
    }
}

impl Serialize for CategoryTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Classifies a filename (basename only, no directory part).
///
/// Never touches the filesystem and never fails.
pub fn classify(file_name: &str) -> BTreeSet<CategoryTag> {
    let mut tags = BTreeSet::new();
    let name_path = Path::new(file_name);

    if let Some(ext) = name_path.extension().map(|e| e.to_string_lossy())
        && !ext.is_empty()
    {
        tags.insert(CategoryTag::Extension(format!(".{}", ext.to_lowercase())));
    }

    let stem = name_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Some(prefix) = leading_token(&stem) {
        tags.insert(CategoryTag::Prefix(prefix.to_string()));
    }

    if DATE.is_match(file_name) {
        tags.insert(CategoryTag::Date);
    }

    if VERSION.is_match(file_name) {
        tags.insert(CategoryTag::Version);
    }

    tags
}

/// First token of a separated name, if it names a project.
///
/// A name without any separator has no prefix, and a purely numeric leading
/// token is a date or sequence number rather than a project name. `.` and
/// `..` are never prefixes since they cannot name a project folder.
fn leading_token(stem: &str) -> Option<&str> {
    let mut tokens = SEPARATORS.split(stem);
    let first = tokens.next()?;
    if first.is_empty() || tokens.next().is_none() {
        return None;
    }
    if first.chars().all(|c| c.is_ascii_digit()) || matches!(first, "." | "..") {
        return None;
    }
    Some(first)
}
