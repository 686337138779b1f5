//! Error types for manifest loading
//!
//! Loading distinguishes two classes of problems:
//! - Fatal: the manifest source cannot be read at all (`ManifestError`)
//! - Recoverable: a single record is unusable and is skipped (`LoadWarning`)

use serde::Serialize;
use std::path::PathBuf;

/// Fatal manifest load errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Manifest file could not be opened or read
    #[error("manifest unreadable at {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Non-file manifest source could not deliver content
    #[error("manifest source '{origin}' unavailable: {message}")]
    Unavailable { origin: String, message: String },

    /// Document is not valid YAML and no fallback was allowed
    #[error("manifest syntax error in {origin}: {message}")]
    Syntax { origin: String, message: String },
}

impl ManifestError {
    /// Create unreadable error for path
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Create syntax error for an origin
    pub fn syntax(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Syntax {
            origin: origin.into(),
            message: message.into(),
        }
    }
}

/// Why a single manifest record was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum EntryDefect {
    /// None of the identifier labels carried a value
    #[error("no identifier field")]
    MissingIdentifier,

    /// The download URL label is absent or empty
    #[error("no download_url field")]
    MissingDownloadUrl,

    /// Identifier reduced to nothing after stripping the public base URL
    #[error("identifier '{0}' yields an empty object key")]
    EmptyObjectKey(String),

    /// Record is not a mapping of labels to values
    #[error("record is not a mapping")]
    NotAMapping,

    /// Key already claimed by an earlier record
    #[error("duplicate object key '{0}'")]
    DuplicateKey(String),
}

/// Non-fatal problem recorded while loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadWarning {
    /// A record was skipped
    MalformedEntry {
        /// Zero-based record position in the source
        record: usize,
        /// One-based line where the record starts, when known
        line: Option<usize>,
        /// What was wrong with it
        defect: EntryDefect,
    },

    /// Structured parsing failed; records were recovered by line scanning
    FellBackToLineScan { reason: String },

    /// Source held bytes that are not UTF-8; they were replaced before parsing
    InvalidUtf8,
}

impl LoadWarning {
    /// Whether this warning represents a skipped record
    #[inline]
    #[must_use]
    pub fn is_skipped_entry(&self) -> bool {
        matches!(self, Self::MalformedEntry { .. })
    }
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedEntry {
                record,
                line: Some(line),
                defect,
            } => write!(f, "skipped record {record} (line {line}): {defect}"),
            Self::MalformedEntry {
                record,
                line: None,
                defect,
            } => write!(f, "skipped record {record}: {defect}"),
            Self::FellBackToLineScan { reason } => {
                write!(f, "not valid YAML, recovered records by line scan: {reason}")
            }
            Self::InvalidUtf8 => write!(f, "invalid UTF-8 replaced with U+FFFD"),
        }
    }
}
