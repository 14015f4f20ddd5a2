//! smartsort - filename pattern analysis and folder cleanup
//!
//! This library classifies filenames into pattern groups (extension, prefix,
//! date, version), turns those groups into organization suggestions and
//! applies a chosen suggestion to a directory. It also finds items that have
//! not been accessed for a number of days, searches names by keyword and runs
//! bulk delete/copy/move operations over the results.

pub mod analysis;
pub mod bulk;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod grouping;
pub mod keyword;
pub mod output;
pub mod pattern;
pub mod stale;
pub mod suggestion;
pub mod walker;

pub use analysis::Analysis;
pub use bulk::{Action, BulkOperator, BulkReport};
pub use config::{CompiledFilters, Config, ConfigError, FilterRules};
pub use error::{FailureKind, ItemFailure, SortError, SortResult};
pub use executor::{ExecutionReport, PlanExecutor, PlannedMove};
pub use grouping::Grouping;
pub use keyword::KeywordQuery;
pub use pattern::{CategoryTag, classify};
pub use stale::{AgedItem, StaleScan, filter_stale, find_stale};
pub use suggestion::{Suggestion, SuggestionKind, synthesize};
