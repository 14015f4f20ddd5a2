//! Command-line interface for smartsort.
//!
//! Parses arguments, loads configuration and drives the library: analysis
//! and suggestion application, stale-file handling and keyword search.

use crate::analysis::{self, Analysis};
use crate::bulk::{Action, BulkOperator};
use crate::config::{CompiledFilters, Config, SearchDefaults};
use crate::error::{SortError, SortResult};
use crate::keyword::{self, KeywordQuery};
use crate::output::OutputFormatter;
use crate::stale;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Organize folders by filename patterns, find stale files, search by keyword.
#[derive(Parser, Debug)]
#[command(name = "smartsort", version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze filenames and list organization suggestions
    Analyze {
        directory: PathBuf,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply one of the suggestions printed by `analyze`
    Apply {
        directory: PathBuf,

        /// Suggestion number as printed by `analyze` (starting at 1)
        #[arg(short, long)]
        suggestion: usize,

        /// Show what would be moved without touching any file
        #[arg(long)]
        dry_run: bool,
    },
    /// Find files and folders not accessed for a number of days
    Stale {
        directory: PathBuf,

        /// Days without access (defaults to the configured value)
        #[arg(short, long)]
        days: Option<i64>,

        #[command(flatten)]
        target: TargetArgs,
    },
    /// Find files and folders whose name contains a keyword
    Search {
        directory: PathBuf,

        keyword: String,

        #[command(flatten)]
        matching: MatchArgs,

        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Keyword matching switches. Each pair overrides the `[search]` config
/// in either direction; the last flag given wins.
#[derive(Args, Debug, Clone, Default)]
pub struct MatchArgs {
    /// Match case exactly
    #[arg(long, overrides_with = "ignore_case")]
    pub case_sensitive: bool,

    /// Ignore case
    #[arg(long, overrides_with = "case_sensitive")]
    pub ignore_case: bool,

    /// Also match the singular form of a keyword ending in "s"
    #[arg(long, overrides_with = "no_plural")]
    pub plural: bool,

    /// Do not match the singular form of a keyword ending in "s"
    #[arg(long, overrides_with = "plural")]
    pub no_plural: bool,
}

impl MatchArgs {
    /// Resolves the flags against the configured defaults.
    pub fn resolve(&self, defaults: &SearchDefaults) -> SearchDefaults {
        SearchDefaults {
            case_sensitive: flag_pair(self.case_sensitive, self.ignore_case)
                .unwrap_or(defaults.case_sensitive),
            include_plural: flag_pair(self.plural, self.no_plural)
                .unwrap_or(defaults.include_plural),
        }
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// What to do with the items found by `stale` or `search`.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    #[arg(short, long, value_enum, default_value_t = TargetAction::List)]
    pub action: TargetAction,

    /// Destination folder for copy and move
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Show what would happen without touching any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAction {
    List,
    Delete,
    Copy,
    Move,
}

impl TargetAction {
    fn bulk_action(self) -> Option<Action> {
        match self {
            TargetAction::List => None,
            TargetAction::Delete => Some(Action::Delete),
            TargetAction::Copy => Some(Action::Copy),
            TargetAction::Move => Some(Action::Move),
        }
    }
}

/// Runs a parsed command line.
///
/// # Errors
///
/// Any operation-level error; per-item failures are printed, not returned.
pub fn run(cli: Cli) -> SortResult<()> {
    let config = Config::load(cli.config.as_deref())?;
    let filters = config.compile_filters()?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Command::Analyze { directory, json } => analyze(&directory, filters, json),
        Command::Apply {
            directory,
            suggestion,
            dry_run,
        } => apply(&directory, filters, suggestion, dry_run),
        Command::Stale {
            directory,
            days,
            target,
        } => {
            let days = days.unwrap_or(config.stale.days);
            stale_files(&directory, &filters, days, &target)
        }
        Command::Search {
            directory,
            keyword,
            matching,
            target,
        } => {
            let query = KeywordQuery::with_defaults(&keyword, &matching.resolve(&config.search))?;
            search(&directory, &filters, &query, &target)
        }
    }
}

/// Runs the analysis on a worker thread and waits for its result.
fn run_analysis(directory: &Path, filters: CompiledFilters) -> SortResult<Analysis> {
    let spinner = OutputFormatter::create_progress_bar(0);
    spinner.set_message(format!("Analyzing {}", directory.display()));
    let receiver = analysis::spawn(directory.to_path_buf(), filters);
    let result = receiver
        .recv()
        .map_err(|_| SortError::Analysis("worker stopped without a result".to_string()))?;
    spinner.finish_and_clear();
    result
}

fn analyze(directory: &Path, filters: CompiledFilters, json: bool) -> SortResult<()> {
    let analysis = run_analysis(directory, filters)?;
    if json {
        OutputFormatter::plain(&serde_json::to_string_pretty(&analysis)?);
    } else {
        OutputFormatter::analysis(&analysis);
        OutputFormatter::plain(&format!(
            "\nRun 'smartsort apply {} --suggestion <N>' to apply one.",
            directory.display()
        ));
    }
    Ok(())
}

fn apply(
    directory: &Path,
    filters: CompiledFilters,
    number: usize,
    dry_run: bool,
) -> SortResult<()> {
    let index = number.checked_sub(1).ok_or_else(|| {
        SortError::InvalidArgument("suggestions are numbered from 1".to_string())
    })?;
    let analysis = run_analysis(directory, filters)?;

    if dry_run {
        let moves = analysis.preview(index)?;
        if let Some(suggestion) = analysis.suggestion(index) {
            OutputFormatter::dry_run_notice(&format!("Applying '{}'", suggestion.name));
        }
        OutputFormatter::planned_moves(directory, &moves);
        return Ok(());
    }

    let total = analysis.preview(index)?.len() as u64;
    if let Some(suggestion) = analysis.suggestion(index) {
        OutputFormatter::info(&format!("Applying '{}'", suggestion.name));
    }
    let pb = OutputFormatter::create_progress_bar(total);
    let report = analysis.apply_with(index, |_| pb.inc(1))?;
    pb.finish_and_clear();

    OutputFormatter::execution_report(&report);
    Ok(())
}

fn stale_files(
    directory: &Path,
    filters: &CompiledFilters,
    days: i64,
    target: &TargetArgs,
) -> SortResult<()> {
    let scan = stale::find_stale(directory, days, filters)?;
    OutputFormatter::stale_scan(&scan);
    act_on(&scan.paths(), target)
}

fn search(
    directory: &Path,
    filters: &CompiledFilters,
    query: &KeywordQuery,
    target: &TargetArgs,
) -> SortResult<()> {
    let found = keyword::search(directory, query, filters)?;
    OutputFormatter::info(&format!("Items matching '{}':", query.keyword()));
    OutputFormatter::path_list(&found);
    act_on(&found, target)
}

/// Applies the requested bulk action to `paths`.
fn act_on(paths: &[PathBuf], target: &TargetArgs) -> SortResult<()> {
    let Some(action) = target.action.bulk_action() else {
        return Ok(());
    };
    if action.needs_destination() && target.dest.is_none() {
        return Err(SortError::InvalidArgument(format!(
            "--dest is required for {:?}",
            action
        )));
    }
    if paths.is_empty() {
        OutputFormatter::plain("Nothing to do.");
        return Ok(());
    }

    if target.dry_run {
        let where_to = target
            .dest
            .as_ref()
            .map(|d| format!(" into {}", d.display()))
            .unwrap_or_default();
        OutputFormatter::dry_run_notice(&format!(
            "{:?} {} items{}. No files were modified.",
            action,
            paths.len(),
            where_to
        ));
        return Ok(());
    }

    let pb = OutputFormatter::create_progress_bar(paths.len() as u64);
    let report =
        BulkOperator::run_with(paths, action, target.dest.as_deref(), |_| pb.inc(1))?;
    pb.finish_and_clear();
    OutputFormatter::bulk_report(action, &report);
    Ok(())
}
