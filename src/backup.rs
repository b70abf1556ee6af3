//! Zip backups taken before an organization run.
//!
//! Before any file is moved, the top-level regular files of the target
//! directory are archived into `<base>/backup/backup_YYYYMMDD-HHMMSS.zip`,
//! so a run can be recovered from even after renames. Hidden files and
//! subdirectories (including earlier backups and the logs directory) are
//! not archived.

use chrono::Local;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

/// Name of the backup subdirectory inside the organized directory.
pub const BACKUP_DIR_NAME: &str = "backup";

/// Errors that can occur while creating a backup archive.
#[derive(Debug)]
pub enum BackupError {
    Io(io::Error),
    Zip(zip::result::ZipError),
}

impl std::fmt::Display for BackupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupError::Io(e) => write!(f, "Backup IO error: {}", e),
            BackupError::Zip(e) => write!(f, "Backup archive error: {}", e),
        }
    }
}

impl std::error::Error for BackupError {}

impl From<io::Error> for BackupError {
    fn from(e: io::Error) -> Self {
        BackupError::Io(e)
    }
}

impl From<zip::result::ZipError> for BackupError {
    fn from(e: zip::result::ZipError) -> Self {
        BackupError::Zip(e)
    }
}

/// Archives the top-level regular files of `base_path` into a timestamped
/// zip under `<base>/backup/`.
///
/// Returns the path of the archive, or `None` when the directory holds no
/// files worth backing up (no archive is created in that case).
pub fn create_backup(base_path: &Path) -> Result<Option<PathBuf>, BackupError> {
    let files = backup_candidates(base_path)?;
    if files.is_empty() {
        return Ok(None);
    }

    let backup_dir = base_path.join(BACKUP_DIR_NAME);
    fs::create_dir_all(&backup_dir)?;

    let archive_path = backup_dir.join(format!(
        "backup_{}.zip",
        Local::now().format("%Y%m%d-%H%M%S")
    ));

    let mut writer = ZipWriter::new(File::create(&archive_path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        writer.start_file(name, options)?;
        let mut reader = File::open(path)?;
        io::copy(&mut reader, &mut writer)?;
    }
    writer.finish()?;

    Ok(Some(archive_path))
}

/// Lists the top-level regular files eligible for backup, skipping hidden
/// files. The result is sorted for a stable archive layout.
fn backup_candidates(base_path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(base_path)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use zip::ZipArchive;

    #[test]
    fn test_backup_archives_top_level_files() {
        let temp_dir = TempDir::new().expect("temp dir");
        fs::write(temp_dir.path().join("a.sql"), "SELECT 1;").expect("write");
        fs::write(temp_dir.path().join("b.txt"), "notes").expect("write");
        fs::create_dir(temp_dir.path().join("subdir")).expect("mkdir");
        fs::write(temp_dir.path().join("subdir").join("c.txt"), "nested").expect("write");
        fs::write(temp_dir.path().join(".hidden"), "secret").expect("write");

        let archive_path = create_backup(temp_dir.path())
            .expect("backup should succeed")
            .expect("archive should be created");

        assert!(archive_path.starts_with(temp_dir.path().join(BACKUP_DIR_NAME)));

        let archive =
            ZipArchive::new(File::open(&archive_path).expect("open archive")).expect("read zip");
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.sql"));
        assert!(names.contains(&"b.txt"));
    }

    #[test]
    fn test_backup_preserves_file_content() {
        let temp_dir = TempDir::new().expect("temp dir");
        fs::write(temp_dir.path().join("a.sql"), "SELECT 42;").expect("write");

        let archive_path = create_backup(temp_dir.path())
            .expect("backup should succeed")
            .expect("archive should be created");

        let mut archive =
            ZipArchive::new(File::open(&archive_path).expect("open archive")).expect("read zip");
        let mut entry = archive.by_name("a.sql").expect("entry exists");
        let mut content = String::new();
        io::Read::read_to_string(&mut entry, &mut content).expect("read entry");
        assert_eq!(content, "SELECT 42;");
    }

    #[test]
    fn test_backup_of_empty_directory_is_skipped() {
        let temp_dir = TempDir::new().expect("temp dir");
        let result = create_backup(temp_dir.path()).expect("backup should succeed");
        assert!(result.is_none());
        assert!(!temp_dir.path().join(BACKUP_DIR_NAME).exists());
    }
}
