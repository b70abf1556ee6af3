//! sqltidy - extension-based directory organization with SQL-aware renaming
//!
//! This library provides utilities for categorizing files by extension,
//! moving them into category-named subdirectories, extracting ticket, client
//! and date metadata from SQL script comments to rename those scripts, and
//! the supporting shell: dated operation logs with retention, zip backups,
//! dry-run previews and TOML configuration of the category table.

pub mod backup;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod oplog;
pub mod output;
pub mod sql_metadata;

pub use config::{ConfigError, TidyConfig};
pub use file_category::{CategoryTable, Categorizer, DATABASE_CATEGORY, OTHER_CATEGORY};
pub use file_organizer::{FileOrganizer, Operation};
pub use sql_metadata::{ExtractedMetadata, SqlMetadataExtractor, build_filename};

pub use cli::{Cli, ClassificationResult, RunOptions, run_cli};
