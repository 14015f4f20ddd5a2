//! Grouping of walked paths by category tag.
//!
//! A [`Grouping`] maps each [`CategoryTag`] to the paths carrying it, in the
//! order they were discovered. Membership is non-exclusive: one path can sit
//! under several tags, but never twice under the same one.

use crate::pattern::{CategoryTag, classify};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Paths under one tag, in first-seen order.
#[derive(Debug, Clone, Default)]
struct Members {
    paths: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl Members {
    fn push(&mut self, path: &Path) -> bool {
        if self.seen.contains(path) {
            return false;
        }
        self.seen.insert(path.to_path_buf());
        self.paths.push(path.to_path_buf());
        true
    }
}

/// Category tag → member paths. Tags iterate in lexical order.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    groups: BTreeMap<CategoryTag, Members>,
}

impl Grouping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups a sequence of paths by the tags of their basenames.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut grouping = Self::new();
        for path in paths {
            grouping.insert(path.as_ref());
        }
        grouping
    }

    /// Classifies `path` and appends it to every matching tag it is not already under.
    ///
    /// Returns the tags the path was newly added to.
    pub fn insert(&mut self, path: &Path) -> Vec<CategoryTag> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        classify(&file_name)
            .into_iter()
            .filter(|tag| self.groups.entry(tag.clone()).or_default().push(path))
            .collect()
    }

    /// Merges partial groupings built from shards of one walk.
    ///
    /// Each partial comes with the discovery sequence number of every path it
    /// saw. Members are re-ordered by sequence number per tag, so the result
    /// matches what a single sequential pass would have produced. Paths without
    /// a sequence number sort last.
    pub fn merge<I>(partials: I) -> Self
    where
        I: IntoIterator<Item = (Grouping, HashMap<PathBuf, u64>)>,
    {
        let mut sequenced: BTreeMap<CategoryTag, Vec<(u64, PathBuf)>> = BTreeMap::new();
        for (partial, sequence) in partials {
            for (tag, members) in partial.groups {
                let slot = sequenced.entry(tag).or_default();
                for path in members.paths {
                    let seq = sequence.get(&path).copied().unwrap_or(u64::MAX);
                    slot.push((seq, path));
                }
            }
        }

        let mut merged = Self::new();
        for (tag, mut members) in sequenced {
            members.sort_by_key(|(seq, _)| *seq);
            let group = merged.groups.entry(tag).or_default();
            for (_, path) in members {
                group.push(&path);
            }
        }
        merged
    }

    /// Member paths of `tag`, or `None` if no path carries it.
    pub fn get(&self, tag: &CategoryTag) -> Option<&[PathBuf]> {
        self.groups.get(tag).map(|m| m.paths.as_slice())
    }

    pub fn contains_tag(&self, tag: &CategoryTag) -> bool {
        self.groups.contains_key(tag)
    }

    /// Tags in lexical order.
    pub fn tags(&self) -> impl Iterator<Item = &CategoryTag> {
        self.groups.keys()
    }

    /// `(tag, members)` pairs in lexical tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&CategoryTag, &[PathBuf])> {
        self.groups.iter().map(|(tag, m)| (tag, m.paths.as_slice()))
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of distinct paths across all tags.
    pub fn path_count(&self) -> usize {
        self.groups
            .values()
            .flat_map(|m| m.paths.iter())
            .collect::<HashSet<_>>()
            .len()
    }
}

impl Serialize for Grouping {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
