//! Dated operation logs and run reports.
//!
//! Every real (non-dry-run) organization appends human-readable lines to a
//! dated log file under `<base>/logs/` and writes a machine-readable JSON
//! report of the operations performed. Log files older than the configured
//! retention window are pruned at the start of each run; the file's own
//! name carries its date, so pruning does not depend on filesystem
//! timestamps.

use chrono::{Local, NaiveDate};
use serde_json::json;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::file_organizer::Operation;

/// Name of the log subdirectory inside the organized directory.
pub const LOG_DIR_NAME: &str = "logs";

const LOG_FILE_PREFIX: &str = "sqltidy_";
const LOG_FILE_SUFFIX: &str = ".log";
const LOG_DATE_FORMAT: &str = "%Y%m%d";

/// Append-only log for a single day of organization runs.
///
/// Lines are formatted `timestamp - LEVEL - message`, one operation or
/// warning per line.
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Opens (creating if needed) today's log file under `<base>/logs/`.
    pub fn open(base_path: &Path) -> io::Result<Self> {
        let logs_dir = base_path.join(LOG_DIR_NAME);
        fs::create_dir_all(&logs_dir)?;

        let file_name = format!(
            "{}{}{}",
            LOG_FILE_PREFIX,
            Local::now().format(LOG_DATE_FORMAT),
            LOG_FILE_SUFFIX
        );
        Ok(Self {
            path: logs_dir.join(file_name),
        })
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self, message: &str) -> io::Result<()> {
        self.append("INFO", message)
    }

    pub fn warn(&self, message: &str) -> io::Result<()> {
        self.append("WARNING", message)
    }

    fn append(&self, level: &str, message: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            message
        )
    }
}

/// Deletes dated log files older than the retention window.
///
/// Only files named `sqltidy_YYYYMMDD.log` are considered; anything else in
/// the directory is left alone, as are files whose date does not parse.
/// Returns the number of files removed. A missing logs directory is not an
/// error.
pub fn prune_old_logs(logs_dir: &Path, retention_days: u32, today: NaiveDate) -> io::Result<usize> {
    if !logs_dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(logs_dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();

        let Some(date) = log_file_date(&file_name) else {
            continue;
        };

        let age_days = (today - date).num_days();
        if age_days > i64::from(retention_days) {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Parses the date out of a `sqltidy_YYYYMMDD.log` filename.
fn log_file_date(file_name: &str) -> Option<NaiveDate> {
    let stamp = file_name
        .strip_prefix(LOG_FILE_PREFIX)?
        .strip_suffix(LOG_FILE_SUFFIX)?;
    NaiveDate::parse_from_str(stamp, LOG_DATE_FORMAT).ok()
}

/// Machine-readable record of one organization run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// ISO 8601 timestamp of when the run started.
    pub timestamp: String,
    /// The directory that was organized.
    pub base_path: PathBuf,
    /// All operations performed in this run.
    pub operations: Vec<Operation>,
}

impl RunReport {
    /// Creates an empty report for a run starting now.
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            base_path,
            operations: Vec::new(),
        }
    }

    /// Adds an operation to this report.
    pub fn add_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Saves this report as pretty-printed JSON under the logs directory,
    /// returning the path written.
    pub fn save(&self, logs_dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(logs_dir)?;

        let json = json!({
            "timestamp": self.timestamp,
            "base_path": self.base_path.to_string_lossy().to_string(),
            "operations": self.operations.iter().map(|op| {
                json!({
                    "original_path": op.original_path.to_string_lossy().to_string(),
                    "new_path": op.new_path.to_string_lossy().to_string(),
                    "category": op.category,
                })
            }).collect::<Vec<_>>(),
        });

        let json_string = serde_json::to_string_pretty(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let report_path = logs_dir.join(format!(
            "report_{}.json",
            Local::now().format("%Y%m%d-%H%M%S")
        ));
        fs::write(&report_path, json_string)?;
        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_run_log_appends_lines() {
        let temp_dir = TempDir::new().expect("temp dir");
        let log = RunLog::open(temp_dir.path()).expect("open log");

        log.info("moved a.sql -> database/a.sql").expect("write");
        log.warn("could not move b.txt").expect("write");

        let content = fs::read_to_string(log.path()).expect("read log");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO - moved a.sql -> database/a.sql"));
        assert!(lines[1].contains("WARNING - could not move b.txt"));
    }

    #[test]
    fn test_run_log_file_is_dated() {
        let temp_dir = TempDir::new().expect("temp dir");
        let log = RunLog::open(temp_dir.path()).expect("open log");

        let file_name = log
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .expect("log file name");
        assert!(log_file_date(&file_name).is_some());
    }

    #[test]
    fn test_prune_removes_only_expired_logs() {
        let temp_dir = TempDir::new().expect("temp dir");
        let logs_dir = temp_dir.path().join(LOG_DIR_NAME);
        fs::create_dir(&logs_dir).expect("create logs dir");

        let today = NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date");
        let old = today - Duration::days(40);
        let recent = today - Duration::days(5);

        let old_name = format!("sqltidy_{}.log", old.format("%Y%m%d"));
        let recent_name = format!("sqltidy_{}.log", recent.format("%Y%m%d"));
        fs::write(logs_dir.join(&old_name), "old").expect("write");
        fs::write(logs_dir.join(&recent_name), "recent").expect("write");
        fs::write(logs_dir.join("notes.txt"), "unrelated").expect("write");

        let removed = prune_old_logs(&logs_dir, 30, today).expect("prune");

        assert_eq!(removed, 1);
        assert!(!logs_dir.join(&old_name).exists());
        assert!(logs_dir.join(&recent_name).exists());
        assert!(logs_dir.join("notes.txt").exists());
    }

    #[test]
    fn test_prune_missing_directory_is_noop() {
        let temp_dir = TempDir::new().expect("temp dir");
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date");
        let removed =
            prune_old_logs(&temp_dir.path().join("nope"), 30, today).expect("prune missing dir");
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_unparseable_log_names_are_kept() {
        let temp_dir = TempDir::new().expect("temp dir");
        let logs_dir = temp_dir.path().join(LOG_DIR_NAME);
        fs::create_dir(&logs_dir).expect("create logs dir");
        fs::write(logs_dir.join("sqltidy_notadate.log"), "x").expect("write");

        let today = NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date");
        let removed = prune_old_logs(&logs_dir, 0, today).expect("prune");

        assert_eq!(removed, 0);
        assert!(logs_dir.join("sqltidy_notadate.log").exists());
    }

    #[test]
    fn test_run_report_round_trips_operations() {
        let temp_dir = TempDir::new().expect("temp dir");
        let logs_dir = temp_dir.path().join(LOG_DIR_NAME);

        let mut report = RunReport::new(temp_dir.path().to_path_buf());
        report.add_operation(Operation {
            original_path: temp_dir.path().join("a.sql"),
            new_path: temp_dir.path().join("database").join("a.sql"),
            category: "database".to_string(),
        });

        let report_path = report.save(&logs_dir).expect("save report");
        assert!(report_path.exists());

        let content = fs::read_to_string(&report_path).expect("read report");
        let value: serde_json::Value = serde_json::from_str(&content).expect("valid json");
        assert_eq!(value["operations"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["operations"][0]["category"], "database");
    }
}
