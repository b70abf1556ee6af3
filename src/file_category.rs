/// File categorization by extension.
///
/// This module provides a clean, maintainable way to map file extensions to
/// category labels (e.g., "images", "database"). The category table is built
/// in two explicit steps: the shipped defaults first, then any caller-supplied
/// overrides on top. Within the table, later entries win when two categories
/// claim the same extension, so override precedence is deterministic rather
/// than an accident of map iteration order.
///
/// # Examples
///
/// ```
/// use sqltidy::file_category::Categorizer;
///
/// let categorizer = Categorizer::from_defaults();
/// assert_eq!(categorizer.classify("mp3"), "audio");
/// assert_eq!(categorizer.classify(".SQL"), "database");
/// assert_eq!(categorizer.classify("xyz"), "other");
/// ```
use std::collections::{BTreeMap, HashMap};

/// Label of the fallback bucket for missing or unrecognized extensions.
pub const OTHER_CATEGORY: &str = "other";

/// Label of the SQL-family category; files landing here get the
/// metadata-based rename treatment.
pub const DATABASE_CATEGORY: &str = "database";

/// An ordered mapping from category label to the extensions it owns.
///
/// Extensions are stored lowercase with a leading dot. The table is an
/// ordered list, not a map: the position of an entry decides precedence when
/// the same extension appears under more than one label.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    entries: Vec<(String, Vec<String>)>,
}

impl CategoryTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates the default table shipped with sqltidy.
    pub fn defaults() -> Self {
        let mut table = Self::new();
        table.push(
            "audio",
            &[".mp3", ".wav", ".ogg", ".flac", ".aac", ".m4a", ".wma"],
        );
        table.push(
            "video",
            &[".mp4", ".mkv", ".avi", ".mov", ".flv", ".wmv", ".webm"],
        );
        table.push(
            "images",
            &[
                ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".bmp", ".tiff", ".ico",
            ],
        );
        table.push(
            "documents",
            &[
                ".pdf", ".txt", ".doc", ".docx", ".md", ".rtf", ".odt", ".xls", ".xlsx", ".ppt",
                ".pptx", ".csv",
            ],
        );
        table.push(
            DATABASE_CATEGORY,
            &[".sql", ".psql", ".tsql", ".ddl", ".dml"],
        );
        table.push(
            "scripts",
            &[
                ".py", ".js", ".ts", ".sh", ".ps1", ".rb", ".pl", ".lua", ".bat",
            ],
        );
        table.push(
            "compressed",
            &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz"],
        );
        table
    }

    /// Appends an entry. Extensions are normalized to lowercase with a
    /// leading dot; empty extensions are dropped.
    pub fn push(&mut self, label: &str, extensions: &[&str]) {
        let normalized = extensions
            .iter()
            .filter_map(|ext| normalize_extension(ext))
            .collect();
        self.entries.push((label.to_string(), normalized));
    }

    /// Applies caller-supplied overrides on top of this table.
    ///
    /// Override entries are appended after the existing ones, so any
    /// extension they claim takes precedence over a default claim. Overrides
    /// are applied in alphabetical label order to keep the result stable
    /// when two override categories claim the same extension.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Vec<String>>) -> Self {
        for (label, extensions) in overrides {
            let refs: Vec<&str> = extensions.iter().map(String::as_str).collect();
            self.push(label, &refs);
        }
        self
    }

    /// Iterates over (label, extensions) entries in precedence order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(label, exts)| (label.as_str(), exts.as_slice()))
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Maps file extensions to category labels.
///
/// The reverse index is built once from a [`CategoryTable`] and is immutable
/// afterwards; `classify` is a total function with no side effects, so a
/// single categorizer can be shared freely.
#[derive(Debug, Clone)]
pub struct Categorizer {
    index: HashMap<String, String>,
}

impl Categorizer {
    /// Builds the reverse extension index from a category table.
    ///
    /// Entries are registered front-to-back; a later entry claiming an
    /// already-registered extension overwrites the earlier claim.
    pub fn new(table: &CategoryTable) -> Self {
        let mut index = HashMap::new();
        for (label, extensions) in table.entries() {
            for ext in extensions {
                index.insert(ext.clone(), label.to_string());
            }
        }
        Self { index }
    }

    /// Convenience constructor over the default table.
    pub fn from_defaults() -> Self {
        Self::new(&CategoryTable::defaults())
    }

    /// Returns the category label for an extension.
    ///
    /// The lookup is case-insensitive and tolerates a missing leading dot.
    /// Empty and unrecognized extensions map to [`OTHER_CATEGORY`].
    ///
    /// # Examples
    ///
    /// ```
    /// use sqltidy::file_category::Categorizer;
    ///
    /// let categorizer = Categorizer::from_defaults();
    /// assert_eq!(categorizer.classify("pdf"), "documents");
    /// assert_eq!(categorizer.classify(""), "other");
    /// ```
    pub fn classify(&self, extension: &str) -> &str {
        match normalize_extension(extension) {
            Some(ext) => self
                .index
                .get(&ext)
                .map(String::as_str)
                .unwrap_or(OTHER_CATEGORY),
            None => OTHER_CATEGORY,
        }
    }
}

/// Normalizes an extension to lowercase with a leading dot.
///
/// Returns `None` for inputs that are empty after trimming (a bare "." has
/// no extension either).
fn normalize_extension(extension: &str) -> Option<String> {
    let trimmed = extension.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}
