//! Configuration loading and walk filtering.
//!
//! Configuration is read-only TOML. It controls which entries the walker sees
//! and supplies defaults for the keyword search and stale-file commands:
//!
//! ```toml
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = [".DS_Store", "Thumbs.db"]
//! patterns = ["*.tmp", "node_modules/**"]
//! extensions = ["bak", "tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//!
//! [search]
//! case_sensitive = false
//! include_plural = true
//!
//! [stale]
//! days = 30
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{0}': expected *.ext or dir/**")]
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Top-level smartsort configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filters: FilterRules,
    #[serde(default)]
    pub search: SearchDefaults,
    #[serde(default)]
    pub stale: StaleDefaults,
}

/// Rules deciding which walked entries are visible to smartsort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to include hidden entries (starting with "."). Defaults to false.
    #[serde(default)]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist, overrides exclude rules.
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for excluding entries from a walk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames (e.g., ".DS_Store", "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against root-relative paths (e.g., "*.tmp", "node_modules/**").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions without the dot (e.g., "bak", "tmp").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the filename.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Glob patterns that override exclude rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Defaults for `smartsort search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDefaults {
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_include_plural")]
    pub include_plural: bool,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            include_plural: default_include_plural(),
        }
    }
}

fn default_include_plural() -> bool {
    true
}

/// Defaults for `smartsort stale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaleDefaults {
    #[serde(default = "default_stale_days")]
    pub days: i64,
}

impl Default for StaleDefaults {
    fn default() -> Self {
        Self {
            days: default_stale_days(),
        }
    }
}

fn default_stale_days() -> i64 {
    30
}

impl Config {
    /// Load configuration, falling back through the usual locations.
    ///
    /// 1. `config_path`, when given
    /// 2. `.smartsortrc.toml` in the current directory
    /// 3. `~/.config/smartsort/config.toml`
    /// 4. built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is found (or explicitly given)
    /// but cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".smartsortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("smartsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile the filter rules for use by the walker.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Pre-compiled filter rules.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

impl CompiledFilters {
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Filters that let everything through, hidden entries included.
    pub fn permissive() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }

    /// Check whether an entry should be visible. `rel_path` is relative to the walk root.
    ///
    /// Include patterns win; after that hidden names, exact filenames,
    /// extensions, globs and regexes each exclude in turn.
    pub fn should_include(&self, rel_path: &Path) -> bool {
        let file_name = rel_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(rel_path))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = rel_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(rel_path))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: false,
            ..Self::permissive()
        }
    }
}
