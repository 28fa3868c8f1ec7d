//! Error types for data loading.

use thiserror::Error;

/// Errors that can occur when loading or saving RON data files.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// File parsed but its content makes no sense.
    #[error("Invalid data in '{path}': {details}")]
    Invalid { path: String, details: String },

    /// File could not be written.
    #[error("Failed to write file '{path}': {details}")]
    WriteError { path: String, details: String },
}
