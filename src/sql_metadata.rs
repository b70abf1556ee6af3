//! Metadata extraction from SQL script content.
//!
//! SQL scripts produced by support work often carry a header comment like:
//!
//! ```sql
//! -- Ticket: LBDM-123
//! -- Client: Acme Corp
//! -- Date: 2023-12-05
//! ```
//!
//! or the block-comment variant `/** Ticket: LBDM-123; Client: Acme; ... */`.
//! This module extracts a ticket number, client name and date from such
//! content and synthesizes a normalized filename
//! `<ticket>_<client>_<YYYY-MM-DD><ext>`.
//!
//! Each field is extracted by an ordered cascade of strategies; the first
//! strategy that yields a match wins for that field, and fields are
//! independent of one another. Nothing here performs I/O or raises: a field
//! that cannot be extracted is simply absent, and [`build_filename`] degrades
//! to the `UNKNOWN` / `UnknownClient` placeholders so a legal filename can
//! always be produced.

use chrono::NaiveDate;
use regex::Regex;

/// Number of leading content lines scanned for metadata. Keeps extraction
/// cost bounded on large dump files.
pub const METADATA_SCAN_LINES: usize = 64;

/// Placeholder used when no ticket number can be found.
pub const UNKNOWN_TICKET: &str = "UNKNOWN";

/// Placeholder used when no client name can be found.
pub const UNKNOWN_CLIENT: &str = "UnknownClient";

/// Metadata extracted from a single SQL script.
///
/// Every field is optional; absence is a valid outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedMetadata {
    /// Ticket identifier of shape `LETTERS-digits`, uppercased.
    pub ticket: Option<String>,
    /// Client name, whitespace-trimmed and non-empty.
    pub client: Option<String>,
    /// Date parsed strictly from a `Date:` tag.
    pub date: Option<NaiveDate>,
}

/// The text a single extraction run looks at: the capped head of the file
/// content plus the original filename.
struct ScanInput<'a> {
    head: &'a str,
    filename: &'a str,
}

type TicketStrategy = fn(&SqlMetadataExtractor, &ScanInput) -> Option<String>;
type ClientStrategy = fn(&SqlMetadataExtractor, &ScanInput) -> Option<String>;
type DateStrategy = fn(&SqlMetadataExtractor, &ScanInput) -> Option<NaiveDate>;

/// Ordered ticket strategies: comment tag, then bare token in the head,
/// then the filename.
const TICKET_STRATEGIES: &[TicketStrategy] = &[
    SqlMetadataExtractor::ticket_from_tag,
    SqlMetadataExtractor::ticket_from_bare_token,
    SqlMetadataExtractor::ticket_from_filename,
];

/// Ordered client strategies: comment tag, then the first `USE` statement.
const CLIENT_STRATEGIES: &[ClientStrategy] = &[
    SqlMetadataExtractor::client_from_tag,
    SqlMetadataExtractor::client_from_use_statement,
];

/// Date strategies: the `Date:` tag only. The caller-supplied fallback date
/// is applied at filename-synthesis time, not here.
const DATE_STRATEGIES: &[DateStrategy] = &[SqlMetadataExtractor::date_from_tag];

/// Extracts ticket/client/date metadata from SQL script text.
///
/// All patterns are compiled once at construction; the extractor itself is
/// immutable and can be reused across files.
#[derive(Debug)]
pub struct SqlMetadataExtractor {
    ticket_tag: Regex,
    ticket_token: Regex,
    client_tag: Regex,
    use_statement: Regex,
    date_tag: Regex,
}

impl SqlMetadataExtractor {
    pub fn new() -> Self {
        Self {
            // Tag context is trusted, so mixed-case tickets are accepted
            // here and uppercased on the way out.
            ticket_tag: compile(r"(?i)ticket\s*:\s*([A-Za-z]{2,}-\d+)"),
            // Bare tokens must be uppercase to avoid matching prose.
            ticket_token: compile(r"\b([A-Z]{2,}-\d+)\b"),
            // Value ends at ';', '*' (block comment close) or end of line.
            client_tag: compile(r"(?im)client\s*:\s*([^;*\r\n]+)"),
            use_statement: compile(r"(?i)\buse\s+\[?([A-Za-z][A-Za-z0-9_]*)"),
            date_tag: compile(r"(?i)date\s*:\s*(\d{4}[-/]\d{1,2}[-/]\d{1,2})"),
        }
    }

    /// Runs the per-field cascades over the content head and filename.
    ///
    /// Only the first [`METADATA_SCAN_LINES`] lines of `content` are
    /// inspected. The call never fails; unfound fields are `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqltidy::sql_metadata::SqlMetadataExtractor;
    ///
    /// let extractor = SqlMetadataExtractor::new();
    /// let meta = extractor.extract("-- Ticket: LBDM-123\nSELECT 1;", "patch.sql");
    /// assert_eq!(meta.ticket.as_deref(), Some("LBDM-123"));
    /// assert!(meta.client.is_none());
    /// ```
    pub fn extract(&self, content: &str, filename: &str) -> ExtractedMetadata {
        let head: String = content
            .lines()
            .take(METADATA_SCAN_LINES)
            .collect::<Vec<_>>()
            .join("\n");
        let input = ScanInput {
            head: &head,
            filename,
        };

        ExtractedMetadata {
            ticket: TICKET_STRATEGIES
                .iter()
                .find_map(|strategy| strategy(self, &input)),
            client: CLIENT_STRATEGIES
                .iter()
                .find_map(|strategy| strategy(self, &input)),
            date: DATE_STRATEGIES
                .iter()
                .find_map(|strategy| strategy(self, &input)),
        }
    }

    fn ticket_from_tag(&self, input: &ScanInput) -> Option<String> {
        self.ticket_tag
            .captures(input.head)
            .map(|caps| caps[1].to_uppercase())
    }

    fn ticket_from_bare_token(&self, input: &ScanInput) -> Option<String> {
        self.ticket_token
            .captures(input.head)
            .map(|caps| caps[1].to_string())
    }

    fn ticket_from_filename(&self, input: &ScanInput) -> Option<String> {
        self.ticket_token
            .captures(input.filename)
            .map(|caps| caps[1].to_string())
    }

    fn client_from_tag(&self, input: &ScanInput) -> Option<String> {
        self.client_tag
            .captures(input.head)
            .map(|caps| caps[1].trim().to_string())
            .filter(|client| !client.is_empty())
    }

    /// Treats the first `USE <database>` identifier as a proxy for the
    /// client name: underscores become spaces and each word gets its first
    /// letter uppercased (`acme_billing` -> `Acme Billing`). The remainder
    /// of each word is preserved so camel-cased database names survive.
    fn client_from_use_statement(&self, input: &ScanInput) -> Option<String> {
        self.use_statement
            .captures(input.head)
            .map(|caps| normalize_database_name(&caps[1]))
            .filter(|client| !client.is_empty())
    }

    /// Parses a `Date:` tag strictly as `YYYY-MM-DD` after normalizing `/`
    /// separators to `-`. A tag that does not parse is treated as no match.
    fn date_from_tag(&self, input: &ScanInput) -> Option<NaiveDate> {
        let caps = self.date_tag.captures(input.head)?;
        let normalized = caps[1].replace('/', "-");
        NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()
    }
}

impl Default for SqlMetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Synthesizes the normalized filename for a SQL script.
///
/// Missing fields degrade to placeholders: `UNKNOWN` for the ticket,
/// `UnknownClient` for the client, and `fallback_date` (typically today)
/// when no date was extracted. Ticket and client values are sanitized so
/// the result is always a legal filename; the original extension is kept.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use sqltidy::sql_metadata::{ExtractedMetadata, build_filename};
///
/// let meta = ExtractedMetadata::default();
/// let fallback = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// assert_eq!(
///     build_filename(&meta, fallback, ".sql"),
///     "UNKNOWN_UnknownClient_2024-01-31.sql"
/// );
/// ```
pub fn build_filename(
    metadata: &ExtractedMetadata,
    fallback_date: NaiveDate,
    original_extension: &str,
) -> String {
    let ticket = metadata
        .ticket
        .as_deref()
        .map(sanitize_component)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TICKET.to_string());

    let client = metadata
        .client
        .as_deref()
        .map(sanitize_component)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    let date = metadata.date.unwrap_or(fallback_date);

    let ext = original_extension.trim();
    let ext = if ext.is_empty() || ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    };

    format!("{}_{}_{}{}", ticket, client, date.format("%Y-%m-%d"), ext)
}

/// Strips characters that are illegal or hazardous in filenames: path
/// separators, `:<>"|?*` and control characters. Leading/trailing
/// whitespace is trimmed; internal whitespace is kept.
fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '<' | '>' | '"' | '|' | '?' | '*') && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

fn normalize_database_name(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn compile(pattern: &str) -> Regex {
    // Patterns are hard-coded and covered by unit tests.
    Regex::new(pattern).expect("invalid built-in pattern")
}
