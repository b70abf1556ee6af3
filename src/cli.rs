//! Command-line interface and run orchestration.
//!
//! This module owns the whole pipeline of a run: load configuration, build
//! the categorizer, prune expired logs, take a zip backup, enumerate the
//! directory's top-level files, classify each one (with SQL metadata
//! renaming for database files) and either preview or execute the moves.

use chrono::{Local, NaiveDate};
use clap::Parser;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backup;
use crate::config::TidyConfig;
use crate::file_category::{Categorizer, DATABASE_CATEGORY};
use crate::file_organizer::FileOrganizer;
use crate::oplog::{self, RunLog, RunReport};
use crate::output::OutputFormatter;
use crate::sql_metadata::{SqlMetadataExtractor, build_filename};

/// Organize a directory by file category and rename SQL scripts from
/// embedded ticket metadata.
#[derive(Parser, Debug)]
#[command(name = "sqltidy", version, about)]
pub struct Cli {
    /// Directory to organize
    pub directory: PathBuf,

    /// Preview the run without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip the zip backup normally taken before moving files
    #[arg(long)]
    pub no_backup: bool,
}

/// Options controlling a single run.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Preview only; no filesystem mutation of any kind.
    pub dry_run: bool,
    /// Whether to archive the directory's files before moving them.
    pub backup: bool,
}

/// The decision made for a single file: where it goes and, for SQL scripts,
/// what it should be called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// Category label, also the destination subdirectory name.
    pub category: String,
    /// Replacement filename for database files; `None` keeps the original.
    pub new_filename: Option<String>,
}

/// A planned move for one file.
#[derive(Debug, Clone)]
pub struct FilePlan {
    /// The file's current full path.
    pub path: PathBuf,
    /// The file's current name.
    pub name: String,
    /// The classification decision for this file.
    pub result: ClassificationResult,
}

/// Entry point used by `main`: unpacks parsed arguments into a run.
pub fn run(cli: Cli) -> Result<(), String> {
    let options = RunOptions {
        dry_run: cli.dry_run,
        backup: !cli.no_backup,
    };
    run_cli(&cli.directory, options, cli.config.as_deref())
}

/// Runs an organization (or dry-run preview) over `base_path`.
pub fn run_cli(
    base_path: &Path,
    options: RunOptions,
    config_path: Option<&Path>,
) -> Result<(), String> {
    let config = TidyConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let categorizer = Categorizer::new(&config.category_table());
    let extractor = SqlMetadataExtractor::new();
    let today = Local::now().date_naive();

    let plans = plan_directory(base_path, &categorizer, &extractor, today)?;

    if options.dry_run {
        preview_run(base_path, &plans);
        return Ok(());
    }
    execute_run(base_path, &config, options, &plans)
}

/// Enumerates the top-level files of `base_path` and classifies each one.
///
/// Hidden files (leading dot) and subdirectories are skipped. Plans are
/// sorted by filename so output and logs are deterministic.
pub fn plan_directory(
    base_path: &Path,
    categorizer: &Categorizer,
    extractor: &SqlMetadataExtractor,
    today: NaiveDate,
) -> Result<Vec<FilePlan>, String> {
    let entries = fs::read_dir(base_path)
        .map_err(|e| format!("Error reading directory {}: {}", base_path.display(), e))?;

    let mut plans = Vec::new();
    for entry in entries.flatten() {
        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            let result = classify_file(&path, categorizer, extractor, today);
            plans.push(FilePlan { path, name, result });
        }
    }

    plans.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(plans)
}

/// Classifies a single file by extension and, for database files, derives
/// the metadata-based replacement filename.
///
/// A database file whose content cannot be read keeps its original name;
/// the move itself is still planned.
pub fn classify_file(
    path: &Path,
    categorizer: &Categorizer,
    extractor: &SqlMetadataExtractor,
    today: NaiveDate,
) -> ClassificationResult {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .unwrap_or_default();
    let category = categorizer.classify(&extension).to_string();

    let new_filename = if category == DATABASE_CATEGORY {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        fs::read_to_string(path).ok().map(|content| {
            let metadata = extractor.extract(&content, &filename);
            build_filename(&metadata, today, &format!(".{}", extension))
        })
    } else {
        None
    };

    ClassificationResult {
        category,
        new_filename,
    }
}

/// Prints what a run would do, without mutating anything: no moves, no
/// backup, no log writes.
fn preview_run(base_path: &Path, plans: &[FilePlan]) {
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", base_path.display()));

    if plans.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return;
    }

    let mut category_counts: HashMap<String, usize> = HashMap::new();
    for plan in plans {
        OutputFormatter::plain(&format!(" - {}", plan.name));
        match &plan.result.new_filename {
            Some(new_name) => OutputFormatter::plain(&format!(
                "   → Would move to {}/ as {}",
                plan.result.category, new_name
            )),
            None => OutputFormatter::plain(&format!("   → Would move to {}/", plan.result.category)),
        }
        *category_counts
            .entry(plan.result.category.clone())
            .or_insert(0) += 1;
    }

    OutputFormatter::summary_table(&category_counts, plans.len());
    OutputFormatter::success("Dry run complete. No files were modified.");
}

/// Executes the planned moves: prune logs, back up, move, log, report.
fn execute_run(
    base_path: &Path,
    config: &TidyConfig,
    options: RunOptions,
    plans: &[FilePlan],
) -> Result<(), String> {
    OutputFormatter::info(&format!("Organizing contents of: {}", base_path.display()));

    let logs_dir = base_path.join(oplog::LOG_DIR_NAME);
    let today = Local::now().date_naive();
    match oplog::prune_old_logs(&logs_dir, config.log_retention_days, today) {
        Ok(removed) if removed > 0 => {
            OutputFormatter::plain(&format!("Pruned {} expired log file(s)", removed));
        }
        Ok(_) => {}
        Err(e) => OutputFormatter::warning(&format!("Could not prune old logs: {}", e)),
    }

    if options.backup {
        match backup::create_backup(base_path) {
            Ok(Some(archive)) => {
                OutputFormatter::plain(&format!("Backup written to {}", archive.display()));
            }
            Ok(None) => {}
            Err(e) => return Err(format!("Error creating backup: {}", e)),
        }
    }

    if plans.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    let log = RunLog::open(base_path).map_err(|e| format!("Error opening log: {}", e))?;
    let mut report = RunReport::new(base_path.to_path_buf());
    let mut category_counts: HashMap<String, usize> = HashMap::new();
    let mut failures = 0usize;

    let progress = OutputFormatter::create_progress_bar(plans.len() as u64);
    for plan in plans {
        progress.set_message(plan.name.clone());

        let outcome = FileOrganizer::move_to_category(
            base_path,
            &plan.path,
            &plan.result.category,
            plan.result.new_filename.as_deref(),
        );
        match outcome {
            Ok(operation) => {
                let line = format!(
                    "Moved {} -> {}",
                    plan.name,
                    operation.new_path.display()
                );
                if let Err(e) = log.info(&line) {
                    OutputFormatter::warning(&format!("Could not write log: {}", e));
                }
                *category_counts
                    .entry(operation.category.clone())
                    .or_insert(0) += 1;
                report.add_operation(operation);
            }
            Err(e) => {
                failures += 1;
                if let Err(log_err) = log.warn(&format!("Failed to move {}: {}", plan.name, e)) {
                    OutputFormatter::warning(&format!("Could not write log: {}", log_err));
                }
                OutputFormatter::error(&e.to_string());
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    match report.save(&logs_dir) {
        Ok(path) => OutputFormatter::plain(&format!("Run report saved to {}", path.display())),
        Err(e) => OutputFormatter::warning(&format!("Could not save run report: {}", e)),
    }

    OutputFormatter::summary_table(&category_counts, plans.len() - failures);

    if failures > 0 {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be organized. Please review errors above.",
            failures
        ));
    } else {
        OutputFormatter::success("Organization complete!");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid test date")
    }

    #[test]
    fn test_classify_file_non_database() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("song.mp3");
        fs::write(&path, "not really audio").expect("write");

        let result = classify_file(
            &path,
            &Categorizer::from_defaults(),
            &SqlMetadataExtractor::new(),
            today(),
        );

        assert_eq!(result.category, "audio");
        assert_eq!(result.new_filename, None);
    }

    #[test]
    fn test_classify_file_database_gets_renamed() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("untitled.sql");
        fs::write(
            &path,
            "-- Ticket: LBDM-123\n-- Client: Acme Corp\n-- Date: 2023-12-05\nSELECT 1;",
        )
        .expect("write");

        let result = classify_file(
            &path,
            &Categorizer::from_defaults(),
            &SqlMetadataExtractor::new(),
            today(),
        );

        assert_eq!(result.category, DATABASE_CATEGORY);
        assert_eq!(
            result.new_filename.as_deref(),
            Some("LBDM-123_Acme Corp_2023-12-05.sql")
        );
    }

    #[test]
    fn test_classify_file_database_without_metadata_uses_placeholders() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("plain.sql");
        fs::write(&path, "SELECT 1;").expect("write");

        let result = classify_file(
            &path,
            &Categorizer::from_defaults(),
            &SqlMetadataExtractor::new(),
            today(),
        );

        assert_eq!(
            result.new_filename.as_deref(),
            Some("UNKNOWN_UnknownClient_2024-03-01.sql")
        );
    }

    #[test]
    fn test_plan_directory_skips_hidden_files_and_directories() {
        let temp_dir = TempDir::new().expect("temp dir");
        fs::write(temp_dir.path().join("b.txt"), "b").expect("write");
        fs::write(temp_dir.path().join("a.txt"), "a").expect("write");
        fs::write(temp_dir.path().join(".hidden"), "h").expect("write");
        fs::create_dir(temp_dir.path().join("subdir")).expect("mkdir");

        let plans = plan_directory(
            temp_dir.path(),
            &Categorizer::from_defaults(),
            &SqlMetadataExtractor::new(),
            today(),
        )
        .expect("plan");

        let names: Vec<&str> = plans.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_plan_directory_missing_path_is_an_error() {
        let result = plan_directory(
            Path::new("/non/existent/path"),
            &Categorizer::from_defaults(),
            &SqlMetadataExtractor::new(),
            today(),
        );
        assert!(result.is_err());
    }
}
