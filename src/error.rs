//! Error types for the lbp_releve library.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting and parsing statements.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error writing TSV output.
    #[error("TSV output error: {0}")]
    Csv(#[from] csv::Error),

    /// A line pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Extracted text was not valid UTF-8.
    #[error("Extracted text is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid date format.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Invalid amount format.
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    /// A recognizer matched a line that then failed to parse fully.
    #[error("Malformed statement line: {0}")]
    MalformedLine(String),

    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// The external text extraction tool failed.
    #[error("pdftotext failed for {}: {}", path.display(), status)]
    Extraction { path: PathBuf, status: ExitStatus },
}
