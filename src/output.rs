//! Output formatting and styling.
//!
//! All terminal output of the CLI goes through [`OutputFormatter`] so the
//! library modules stay free of printing. Diagnostics go to `tracing` instead.

use crate::analysis::Analysis;
use crate::bulk::{Action, BulkReport};
use crate::error::ItemFailure;
use crate::executor::{ExecutionReport, PlannedMove};
use crate::stale::StaleScan;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Prints CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for bulk file operations.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints the group table followed by the numbered suggestions.
    pub fn analysis(analysis: &Analysis) {
        Self::info(&format!(
            "Analyzed {} files in {}",
            analysis.file_count,
            analysis.root.display()
        ));

        Self::header("GROUPS");
        let width = analysis
            .grouping
            .tags()
            .map(|tag| tag.to_string().len())
            .max()
            .unwrap_or(0)
            .max(5);
        println!("{:<width$} | {}", "Group".bold(), "Files".bold(), width = width);
        println!("{}", "-".repeat(width + 10));
        for (tag, paths) in analysis.grouping.iter() {
            println!(
                "{:<width$} | {} {}",
                tag.to_string(),
                paths.len().to_string().green(),
                if paths.len() == 1 { "file" } else { "files" },
                width = width
            );
        }

        Self::header("SUGGESTIONS");
        for (index, suggestion) in analysis.suggestions.iter().enumerate() {
            println!(
                "{}. {} {}",
                (index + 1).to_string().bold(),
                suggestion.name.bold(),
                format!(
                    "({} files)",
                    suggestion.affected_paths(&analysis.grouping)
                )
                .dimmed()
            );
            println!("   {}", suggestion.description);
            for (tag, destination) in &suggestion.structure {
                println!("   {} → {}/", tag, destination.cyan());
            }
        }
    }

    pub fn planned_moves(root: &Path, moves: &[PlannedMove]) {
        if moves.is_empty() {
            Self::dry_run_notice("Nothing would be moved.");
            return;
        }
        for planned in moves {
            let rel_source = planned.source.strip_prefix(root).unwrap_or(&planned.source);
            let rel_dest = planned
                .destination
                .strip_prefix(root)
                .unwrap_or(&planned.destination);
            println!(" - {} → {}", rel_source.display(), rel_dest.display());
        }
        Self::dry_run_notice(&format!("{} files would be moved.", moves.len()));
    }

    pub fn execution_report(report: &ExecutionReport) {
        Self::header("SUMMARY");
        println!("Folders: {}", report.created_folders.len().to_string().green());
        println!("Moved:   {}", report.moved_count.to_string().green());
        Self::failures(&report.failures);
        if report.is_complete_success() {
            Self::success("Organization complete!");
        } else {
            Self::warning("Some files could not be organized. Please review errors above.");
        }
    }

    pub fn stale_scan(scan: &StaleScan) {
        Self::info(&format!(
            "Items not accessed in {} days under {}:",
            scan.cutoff_days,
            scan.root.display()
        ));
        for item in &scan.items {
            let kind = if item.is_directory { "dir " } else { "file" };
            println!(
                " - [{}] {}  {} ({} days ago)",
                kind.dimmed(),
                item.path.display(),
                item.last_access_time
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S"),
                item.days_since_access
            );
        }
        if !scan.skipped.is_empty() {
            Self::warning(&format!(
                "{} entries skipped (metadata unreadable)",
                scan.skipped.len()
            ));
        }
        Self::plain(&format!("Found {} items.", scan.items.len()));
    }

    pub fn path_list(paths: &[PathBuf]) {
        for path in paths {
            println!(" - {}", path.display());
        }
        Self::plain(&format!("Found {} items.", paths.len()));
    }

    pub fn bulk_report(action: Action, report: &BulkReport) {
        Self::header("SUMMARY");
        println!(
            "{}: {}",
            action.past_tense(),
            report.success_count.to_string().green()
        );
        Self::failures(&report.failures);
    }

    fn failures(failures: &[ItemFailure]) {
        if failures.is_empty() {
            return;
        }
        println!("Failed:  {}", failures.len().to_string().red());
        for failure in failures {
            Self::error(&failure.to_string());
        }
    }
}
