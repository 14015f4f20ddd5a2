/// Integration tests for smartsort
///
/// These tests build small directory trees and drive the library end to end:
/// analysis, applying suggestions, stale-file scans, keyword search and bulk
/// operations.
use filetime::FileTime;
use smartsort::{
    Action, Analysis, BulkOperator, CategoryTag, CompiledFilters, Config, FailureKind, KeywordQuery,
    SortError, SuggestionKind, filter_stale, find_stale, keyword,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary directory with helpers for building and inspecting a tree.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file (and any missing parent directories).
    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_file(name, name);
        }
    }

    /// Set the last access time of `rel_path` to `days` days ago.
    fn age(&self, rel_path: &str, days: u64) {
        let when = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
        filetime::set_file_atime(self.path().join(rel_path), FileTime::from_system_time(when))
            .expect("Failed to set access time");
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_dir(), "Directory should exist: {}", path.display());
    }

    /// All files below the root, relative to it, sorted.
    fn list_files_recursive(&self) -> Vec<String> {
        let mut files: Vec<String> = walkdir_files(self.path())
            .into_iter()
            .map(|p| {
                p.strip_prefix(self.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }
}

fn walkdir_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            } else if path.is_dir() {
                files.extend(walkdir_files(&path));
            }
        }
    }
    files
}

fn sample_tree() -> TestFixture {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.txt", "b.txt", "project_x_v1.zip", "2024-03-01_log.txt"]);
    fixture
}

fn suggestion_index(analysis: &Analysis, kind: SuggestionKind) -> usize {
    analysis
        .suggestions
        .iter()
        .position(|s| s.kind == kind)
        .unwrap_or_else(|| panic!("no {:?} suggestion", kind))
}

// ============================================================================
// Test Suite 1: Analysis
// ============================================================================

#[test]
fn test_analysis_groups_and_suggestions() {
    let fixture = sample_tree();

    let analysis = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();
    assert_eq!(analysis.file_count, 4);

    let tags: Vec<String> = analysis.grouping.tags().map(|t| t.to_string()).collect();
    assert_eq!(
        tags,
        vec![
            "date",
            "extension:.txt",
            "extension:.zip",
            "prefix:project",
            "version"
        ]
    );

    let members = |tag: CategoryTag| -> Vec<PathBuf> {
        analysis
            .grouping
            .get(&tag)
            .unwrap_or_else(|| panic!("missing group {}", tag))
            .to_vec()
    };
    let root = fixture.path();
    assert_eq!(
        members(CategoryTag::Extension(".txt".to_string())),
        vec![
            root.join("2024-03-01_log.txt"),
            root.join("a.txt"),
            root.join("b.txt")
        ]
    );
    assert_eq!(
        members(CategoryTag::Extension(".zip".to_string())),
        vec![root.join("project_x_v1.zip")]
    );
    assert_eq!(
        members(CategoryTag::Prefix("project".to_string())),
        vec![root.join("project_x_v1.zip")]
    );
    assert_eq!(
        members(CategoryTag::Date),
        vec![root.join("2024-03-01_log.txt")]
    );
    assert_eq!(
        members(CategoryTag::Version),
        vec![root.join("project_x_v1.zip")]
    );

    let names: Vec<&str> = analysis.suggestions.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "By File Type",
            "By Project/Prefix",
            "By Date",
            "By Version",
            "Single Folder"
        ]
    );

    let by_type = &analysis.suggestions[0];
    assert_eq!(
        by_type.structure.get(&CategoryTag::Extension(".zip".to_string())),
        Some(&"By Type/zip".to_string())
    );
    assert_eq!(by_type.affected_paths(&analysis.grouping), 4);
}

#[test]
fn test_analysis_walks_subdirectories() {
    let fixture = TestFixture::new();
    fixture.create_file("nested/deeper/report_v2.pdf", "x");
    fixture.create_file("top.pdf", "x");

    let analysis = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();
    assert_eq!(analysis.file_count, 2);
    assert_eq!(
        analysis
            .grouping
            .get(&CategoryTag::Extension(".pdf".to_string()))
            .map(|p| p.len()),
        Some(2)
    );
}

#[test]
fn test_analysis_serializes_to_json() {
    let fixture = sample_tree();
    let analysis = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["file_count"], 4);
    assert!(json["grouping"]["extension:.txt"].is_array());
    assert_eq!(json["suggestions"][0]["kind"], "by_file_type");
    assert_eq!(
        json["suggestions"][0]["structure"]["extension:.txt"],
        "By Type/txt"
    );
}

#[test]
fn test_analysis_of_missing_root() {
    let result = Analysis::run(Path::new("/non/existent/path"), &CompiledFilters::default());
    assert!(matches!(result, Err(SortError::NotFound { .. })));
}

#[test]
fn test_analysis_of_empty_directory() {
    let fixture = TestFixture::new();
    let result = Analysis::run(fixture.path(), &CompiledFilters::default());
    assert!(matches!(result, Err(SortError::EmptyResult { .. })));
}

// ============================================================================
// Test Suite 2: Applying Suggestions
// ============================================================================

#[test]
fn test_apply_by_file_type() {
    let fixture = sample_tree();
    let analysis = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();
    let index = suggestion_index(&analysis, SuggestionKind::ByFileType);

    let report = analysis.apply(index).unwrap();

    assert_eq!(report.moved_count, 4);
    assert!(report.is_complete_success());
    fixture.assert_dir_exists("By Type/txt");
    fixture.assert_dir_exists("By Type/zip");
    assert_eq!(
        fixture.list_files_recursive(),
        vec![
            "By Type/txt/2024-03-01_log.txt",
            "By Type/txt/a.txt",
            "By Type/txt/b.txt",
            "By Type/zip/project_x_v1.zip",
        ]
    );
}

#[test]
fn test_reapplying_by_file_type_moves_nothing() {
    let fixture = sample_tree();
    let first = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();
    let index = suggestion_index(&first, SuggestionKind::ByFileType);
    first.apply(index).unwrap();

    let second = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();
    assert_eq!(second.file_count, 4);
    let index = suggestion_index(&second, SuggestionKind::ByFileType);
    let planned = second.preview(index).unwrap();
    let report = second.apply(index).unwrap();

    assert!(planned.is_empty());
    assert_eq!(planned.len(), report.moved_count);
    assert_eq!(report.moved_count, 0);
    assert!(report.is_complete_success());
    fixture.assert_file_exists("By Type/txt/a.txt");
}

#[test]
fn test_single_folder_moves_every_tagged_file_once() {
    let fixture = sample_tree();
    let analysis = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();
    let index = suggestion_index(&analysis, SuggestionKind::SingleFolder);

    let report = analysis.apply(index).unwrap();

    assert_eq!(report.moved_count, 4);
    assert!(report.failures.is_empty());
    assert_eq!(report.created_folders, vec![fixture.path().join("Organized Files")]);
    fixture.assert_file_exists("Organized Files/project_x_v1.zip");
    fixture.assert_file_not_exists("a.txt");
}

#[test]
fn test_by_version_leaves_other_files() {
    let fixture = sample_tree();
    let analysis = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();
    let index = suggestion_index(&analysis, SuggestionKind::ByVersion);

    let report = analysis.apply(index).unwrap();

    assert_eq!(report.moved_count, 1);
    fixture.assert_file_exists("Versions/project_x_v1.zip");
    fixture.assert_file_exists("a.txt");
    fixture.assert_file_exists("2024-03-01_log.txt");
}

#[test]
fn test_preview_does_not_touch_files() {
    let fixture = sample_tree();
    let before = fixture.list_files_recursive();
    let analysis = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();

    let moves = analysis.preview(0).unwrap();

    assert_eq!(moves.len(), 4);
    assert!(
        moves
            .iter()
            .any(|m| m.destination == fixture.path().join("By Type/zip/project_x_v1.zip"))
    );
    assert_eq!(fixture.list_files_recursive(), before);
}

#[test]
fn test_dot_named_file_does_not_break_prefix_suggestion() {
    let fixture = TestFixture::new();
    fixture.create_files(&["..-draft.txt", "report_q1.txt", "report_q2.txt"]);
    let config = Config::from_toml("[filters]\nenable_hidden_files = true\n").unwrap();

    let analysis = Analysis::run(fixture.path(), &config.compile_filters().unwrap()).unwrap();
    assert_eq!(analysis.file_count, 3);
    let index = suggestion_index(&analysis, SuggestionKind::ByPrefix);
    let by_prefix = &analysis.suggestions[index];
    assert_eq!(by_prefix.structure.len(), 1);

    let report = analysis.apply(index).unwrap();
    assert_eq!(report.moved_count, 2);
    fixture.assert_file_exists("By Project/report/report_q1.txt");
    fixture.assert_file_exists("..-draft.txt");
}

#[test]
fn test_apply_unknown_suggestion_is_rejected() {
    let fixture = sample_tree();
    let analysis = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();
    let count = analysis.suggestions.len();

    let result = analysis.apply(count);
    assert!(matches!(result, Err(SortError::InvalidArgument(_))));
    fixture.assert_file_exists("a.txt");
}

#[test]
fn test_apply_records_vanished_file_and_continues() {
    let fixture = sample_tree();
    let analysis = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();
    fs::remove_file(fixture.path().join("b.txt")).unwrap();

    let report = analysis.apply(0).unwrap();

    assert_eq!(report.moved_count, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::NotFound);
    assert_eq!(report.failures[0].path, fixture.path().join("b.txt"));
}

// ============================================================================
// Test Suite 3: Stale Files
// ============================================================================

#[test]
fn test_find_stale_files() {
    let fixture = TestFixture::new();
    fixture.create_files(&["old.log", "recent.log"]);
    fixture.age("old.log", 90);
    fixture.age("recent.log", 2);

    let scan = find_stale(fixture.path(), 30, &CompiledFilters::default()).unwrap();

    assert_eq!(scan.paths(), vec![fixture.path().join("old.log")]);
    let item = &scan.items[0];
    assert!(!item.is_directory);
    assert!(item.days_since_access >= 89.0);
    assert!(scan.skipped.is_empty());
}

#[test]
fn test_stale_scan_rejects_non_positive_days() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.txt"]);

    for days in [0, -3] {
        let result = find_stale(fixture.path(), days, &CompiledFilters::default());
        assert!(matches!(result, Err(SortError::InvalidArgument(_))));
    }
}

#[test]
fn test_stale_scan_of_empty_directory() {
    let fixture = TestFixture::new();
    let result = find_stale(fixture.path(), 30, &CompiledFilters::default());
    assert!(matches!(result, Err(SortError::EmptyResult { .. })));
}

#[test]
fn test_filter_stale_on_collected_stats() {
    let fixture = TestFixture::new();
    fixture.create_files(&["keep.txt", "drop.txt"]);
    fixture.age("drop.txt", 45);

    let stats: Vec<_> = ["keep.txt", "drop.txt"]
        .iter()
        .map(|name| smartsort::walker::stat(&fixture.path().join(name)).unwrap())
        .collect();
    let stale = filter_stale(&stats, 30, chrono::Utc::now()).unwrap();

    assert_eq!(stale, vec![fixture.path().join("drop.txt")]);
}

#[test]
fn test_stale_files_deleted_in_bulk() {
    let fixture = TestFixture::new();
    fixture.create_files(&["ancient.tmp.txt", "old.csv", "fresh.csv"]);
    fixture.age("ancient.tmp.txt", 400);
    fixture.age("old.csv", 60);

    let scan = find_stale(fixture.path(), 30, &CompiledFilters::default()).unwrap();
    let report = BulkOperator::run(&scan.paths(), Action::Delete, None).unwrap();

    assert_eq!(report.success_count, 2);
    fixture.assert_file_not_exists("ancient.tmp.txt");
    fixture.assert_file_not_exists("old.csv");
    fixture.assert_file_exists("fresh.csv");
}

// ============================================================================
// Test Suite 4: Keyword Search and Bulk Operations
// ============================================================================

#[test]
fn test_search_and_move() {
    let fixture = TestFixture::new();
    fixture.create_files(&["backup_01.zip", "Old-BACKUP.tar", "notes.txt"]);
    fixture.create_file("projects/backups/db.sql", "x");
    let archive = TempDir::new().expect("Failed to create temp directory");

    let query = KeywordQuery::new("backups", false, true).unwrap();
    let found = keyword::search(fixture.path(), &query, &CompiledFilters::default()).unwrap();

    let mut names: Vec<String> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Old-BACKUP.tar", "backup_01.zip", "backups"]);

    let report = BulkOperator::run(&found, Action::Move, Some(archive.path())).unwrap();

    assert_eq!(report.success_count, 3);
    assert!(archive.path().join("backup_01.zip").is_file());
    assert!(archive.path().join("backups").join("db.sql").is_file());
    fixture.assert_file_exists("notes.txt");
    fixture.assert_file_not_exists("backup_01.zip");
}

#[test]
fn test_search_without_plural_or_case_folding() {
    let fixture = TestFixture::new();
    fixture.create_files(&["Invoice_March.pdf", "invoice_april.pdf", "invoices.xlsx"]);

    let query = KeywordQuery::new("Invoices", true, false).unwrap();
    let found = keyword::search(fixture.path(), &query, &CompiledFilters::default()).unwrap();
    assert!(found.is_empty());

    let query = KeywordQuery::new("Invoice", true, false).unwrap();
    let found = keyword::search(fixture.path(), &query, &CompiledFilters::default()).unwrap();
    assert_eq!(found, vec![fixture.path().join("Invoice_March.pdf")]);
}

#[test]
fn test_bulk_copy_does_not_overwrite() {
    let fixture = TestFixture::new();
    let source = fixture.create_file("report.pdf", "new");
    let dest = fixture.path().join("copies");
    fs::create_dir(&dest).unwrap();
    fs::write(dest.join("report.pdf"), "old").unwrap();

    let report = BulkOperator::run(&[source.clone()], Action::Copy, Some(&dest)).unwrap();

    assert_eq!(report.success_count, 0);
    assert_eq!(report.failures[0].kind, FailureKind::AlreadyExists);
    assert_eq!(fs::read_to_string(dest.join("report.pdf")).unwrap(), "old");
    assert!(source.exists());
}

// ============================================================================
// Test Suite 5: Configuration and Filtering
// ============================================================================

#[test]
fn test_config_filters_exclude_files_from_analysis() {
    let fixture = TestFixture::new();
    fixture.create_files(&["keep.pdf", "scratch.tmp", "Thumbs.db"]);
    fixture.create_file("node_modules/lib.js", "x");

    let config = Config::from_toml(
        r#"
[filters.exclude]
filenames = ["Thumbs.db"]
extensions = ["tmp"]
patterns = ["node_modules/**"]
"#,
    )
    .unwrap();
    let filters = config.compile_filters().unwrap();

    let analysis = Analysis::run(fixture.path(), &filters).unwrap();
    assert_eq!(analysis.file_count, 1);
    let tags: Vec<String> = analysis.grouping.tags().map(|t| t.to_string()).collect();
    assert_eq!(tags, vec!["extension:.pdf"]);
}

#[test]
fn test_hidden_files_excluded_by_default() {
    let fixture = TestFixture::new();
    fixture.create_files(&[".env", "visible.txt"]);

    let analysis = Analysis::run(fixture.path(), &CompiledFilters::default()).unwrap();
    assert_eq!(analysis.file_count, 1);

    let config = Config::from_toml("[filters]\nenable_hidden_files = true\n").unwrap();
    let analysis = Analysis::run(fixture.path(), &config.compile_filters().unwrap()).unwrap();
    assert_eq!(analysis.file_count, 2);
}

#[test]
fn test_config_file_supplies_search_and_stale_defaults() {
    let fixture = TestFixture::new();
    let path = fixture.create_file(
        "smartsort.toml",
        "[search]\ncase_sensitive = true\ninclude_plural = false\n\n[stale]\ndays = 7\n",
    );

    let config = Config::load(Some(&path)).unwrap();
    assert!(config.search.case_sensitive);
    assert!(!config.search.include_plural);
    assert_eq!(config.stale.days, 7);

    let query = KeywordQuery::with_defaults("Logs", &config.search).unwrap();
    assert!(!query.matches("Log_1.txt"));
    assert!(query.matches("Logs_1.txt"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let result = Config::load(Some(Path::new("/non/existent/smartsort.toml")));
    assert!(result.is_err());
}
