//! Error types for the community readings library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting reading documents.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error writing CSV output.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Malformed XML markup.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// Input file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input directory does not exist.
    #[error("Input directory does not exist: {}", .0.display())]
    InputDirNotFound(PathBuf),

    /// A required document section is absent.
    #[error("Missing section: {0}")]
    MissingSection(&'static str),

    /// Non-numeric text in an integer field.
    #[error("Invalid integer in field '{field}': '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}
