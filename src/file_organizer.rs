/// File organization system for moving files into category directories.
///
/// This module handles the filesystem half of an organization run: creating
/// category subdirectories, moving files into them (optionally under a new
/// name, as with renamed SQL scripts) and recording each move as an
/// [`Operation`] for logging and run reports.
use std::fs;
use std::path::{Path, PathBuf};

/// Represents a single file organization operation.
#[derive(Debug, Clone)]
pub struct Operation {
    /// The original path of the file before organization.
    pub original_path: PathBuf,
    /// The new path of the file after organization.
    pub new_path: PathBuf,
    /// The category the file was moved to.
    pub category: String,
}

/// Errors that can occur during file organization operations.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create a category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file to its category directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// The base directory path is invalid or doesn't exist.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Organizes files by moving them into category subdirectories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves a file into its category directory within the base path.
    ///
    /// If the category directory doesn't exist, it is created. When
    /// `new_name` is given the file is renamed as part of the move;
    /// otherwise the original name is kept. An existing file at the
    /// destination is replaced (`fs::rename` semantics).
    ///
    /// # Arguments
    ///
    /// * `base_path` - The root directory where category subdirectories live
    /// * `file_path` - The full path to the file to be moved
    /// * `category_dir_name` - The subdirectory name for this file's category
    /// * `new_name` - Optional replacement filename applied during the move
    ///
    /// # Returns
    ///
    /// Returns `Ok(Operation)` recording the original and new paths, or an
    /// `OrganizeError` if any step fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sqltidy::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let op = FileOrganizer::move_to_category(
    ///     Path::new("/data/scripts"),
    ///     Path::new("/data/scripts/fix.sql"),
    ///     "database",
    ///     Some("LBDM-123_Acme_2023-12-05.sql"),
    /// );
    /// ```
    pub fn move_to_category(
        base_path: &Path,
        file_path: &Path,
        category_dir_name: &str,
        new_name: Option<&str>,
    ) -> OrganizeResult<Operation> {
        if !base_path.exists() {
            return Err(OrganizeError::InvalidBasePath {
                path: base_path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "base path does not exist",
                ),
            });
        }

        let category_path = base_path.join(category_dir_name);

        if !category_path.exists() {
            fs::create_dir(&category_path).map_err(|e| OrganizeError::DirectoryCreationFailed {
                path: category_path.clone(),
                source: e,
            })?;
        }

        let file_name = match new_name {
            Some(name) => PathBuf::from(name),
            None => file_path
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| OrganizeError::FileMoveFailure {
                    source: file_path.to_path_buf(),
                    destination: category_path.clone(),
                    source_error: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "file has no name component",
                    ),
                })?,
        };

        let destination_path = category_path.join(file_name);

        fs::rename(file_path, &destination_path).map_err(|e| OrganizeError::FileMoveFailure {
            source: file_path.to_path_buf(),
            destination: destination_path.clone(),
            source_error: e,
        })?;

        Ok(Operation {
            original_path: file_path.to_path_buf(),
            new_path: destination_path,
            category: category_dir_name.to_string(),
        })
    }
}
