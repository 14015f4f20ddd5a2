//! Folder-structure suggestions synthesized from a [`Grouping`].
//!
//! Each [`Suggestion`] is an independent plan mapping category tags to
//! destination subfolders below the organized root. Suggestions come out in a
//! fixed order, most broadly applicable first, and the single-folder fallback
//! is always present.

use crate::grouping::Grouping;
use crate::pattern::CategoryTag;
use serde::Serialize;
use std::collections::BTreeMap;

/// Which organizing strategy a suggestion represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    ByFileType,
    ByPrefix,
    ByDate,
    ByVersion,
    SingleFolder,
}

impl SuggestionKind {
    /// Display name shown to the user.
    pub fn name(&self) -> &'static str {
        match self {
            SuggestionKind::ByFileType => "By File Type",
            SuggestionKind::ByPrefix => "By Project/Prefix",
            SuggestionKind::ByDate => "By Date",
            SuggestionKind::ByVersion => "By Version",
            SuggestionKind::SingleFolder => "Single Folder",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SuggestionKind::ByFileType => "Group files by their extension",
            SuggestionKind::ByPrefix => {
                "Group files by their naming prefix (project names, etc.)"
            }
            SuggestionKind::ByDate => "Group files with date patterns in their names",
            SuggestionKind::ByVersion => "Group versioned files together",
            SuggestionKind::SingleFolder => {
                "Move all matched files into one 'Organized Files' folder"
            }
        }
    }
}

/// A named reorganization plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub name: String,
    pub description: String,
    /// Category tag → destination subfolder, relative to the organized root.
    pub structure: BTreeMap<CategoryTag, String>,
}

impl Suggestion {
    fn new(kind: SuggestionKind, structure: BTreeMap<CategoryTag, String>) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            description: kind.description().to_string(),
            structure,
        }
    }

    /// Number of paths the plan would touch, counting each path once.
    pub fn affected_paths(&self, grouping: &Grouping) -> usize {
        let mut seen = std::collections::HashSet::new();
        for tag in self.structure.keys() {
            if let Some(paths) = grouping.get(tag) {
                seen.extend(paths.iter());
            }
        }
        seen.len()
    }
}

/// Destination subfolder for an extension tag value such as `.pdf`.
fn type_folder(ext: &str) -> String {
    let bare = ext.trim_start_matches('.');
    if bare.is_empty() {
        "By Type/No Extension".to_string()
    } else {
        format!("By Type/{}", bare)
    }
}

/// Builds the ordered suggestion list for a grouping.
///
/// Order: By File Type, By Project/Prefix, By Date, By Version, Single Folder.
/// Each of the first four only appears when the grouping has a matching tag;
/// Single Folder is always last and always present, even for an empty grouping.
pub fn synthesize(grouping: &Grouping) -> Vec<Suggestion> {
    let mut suggestions = Vec::with_capacity(5);

    let by_type: BTreeMap<_, _> = grouping
        .tags()
        .filter_map(|tag| match tag {
            CategoryTag::Extension(ext) => Some((tag.clone(), type_folder(ext))),
            _ => None,
        })
        .collect();
    if !by_type.is_empty() {
        suggestions.push(Suggestion::new(SuggestionKind::ByFileType, by_type));
    }

    let by_prefix: BTreeMap<_, _> = grouping
        .tags()
        .filter_map(|tag| match tag {
            CategoryTag::Prefix(prefix) => Some((tag.clone(), format!("By Project/{}", prefix))),
            _ => None,
        })
        .collect();
    if !by_prefix.is_empty() {
        suggestions.push(Suggestion::new(SuggestionKind::ByPrefix, by_prefix));
    }

    if grouping.contains_tag(&CategoryTag::Date) {
        suggestions.push(Suggestion::new(
            SuggestionKind::ByDate,
            BTreeMap::from([(CategoryTag::Date, "By Date".to_string())]),
        ));
    }

    if grouping.contains_tag(&CategoryTag::Version) {
        suggestions.push(Suggestion::new(
            SuggestionKind::ByVersion,
            BTreeMap::from([(CategoryTag::Version, "Versions".to_string())]),
        ));
    }

    let single_folder = grouping
        .tags()
        .map(|tag| (tag.clone(), "Organized Files".to_string()))
        .collect();
    suggestions.push(Suggestion::new(SuggestionKind::SingleFolder, single_folder));

    suggestions
}
