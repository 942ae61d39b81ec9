//! Error types for the bulk load pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Hard failures. None of these are retried; they end the run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 1-based physical line number, header included.
    #[error("line {line} of {path} is not valid {encoding}")]
    Decoding {
        path: PathBuf,
        line: u64,
        encoding: &'static str,
    },

    #[error("unknown text encoding '{label}'")]
    UnknownEncoding { label: String },

    /// Only ASCII-compatible encodings can be split on raw newline bytes.
    #[error("text encoding '{label}' is not ASCII-compatible")]
    UnsupportedEncoding { label: String },

    #[error("chunk size must be at least 1")]
    InvalidChunkSize,

    #[error("malformed row at line {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: ParseError,
    },

    #[error("failed encoding bulk document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("bulk request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl LoadError {
    /// Shifts a chunk-relative parse error line onto the file's line numbering.
    pub(crate) fn offset_line(self, offset: u64) -> Self {
        match self {
            LoadError::Parse { line, source } => LoadError::Parse {
                line: line + offset,
                source,
            },
            other => other,
        }
    }
}

/// Why a single row could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected at least {expected} fields, found {found}")]
    MissingField { expected: usize, found: usize },

    #[error("field {field} has non-integer value '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("could not split row: {message}")]
    Split { message: String },
}
