//! Error types for the CSV reader.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or reading a CSV file.
///
/// Each failure kind is a distinct variant so callers can tell a missing
/// input apart from malformed content.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// The path does not exist, is not a regular file, or cannot be opened.
    #[error("Could not open CSV file \"{}\"", path.display())]
    ResourceNotFound { path: PathBuf },

    /// An accessor was called before any successful `load`.
    #[error("No CSV file has been loaded")]
    Usage,

    /// The next line could not be decoded into any fields.
    #[error("Malformed data at line {read_index}")]
    MalformedRow { read_index: usize },

    /// A decoded row does not have one value per column.
    #[error("Expected {expected} column(s) but received data with {actual} column(s)")]
    ArityMismatch { expected: usize, actual: usize },

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error on an already opened file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReaderError {
    pub(crate) fn resource_not_found(path: impl Into<PathBuf>) -> Self {
        ReaderError::ResourceNotFound { path: path.into() }
    }
}

/// Errors raised while building or loading a [`crate::ReaderConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Delimiter and quote must each be a single ASCII character.
    #[error("{field} must be a single ASCII character, got {value:?}")]
    NonAscii { field: &'static str, value: char },

    /// Delimiter and quote character must differ.
    #[error("delimiter and quote must differ, both are {0:?}")]
    DelimiterIsQuote(char),

    /// The line-break token used for counting lines is empty.
    #[error("line_break must not be empty")]
    EmptyLineBreak,

    /// The scan buffer must hold at least one byte.
    #[error("buffer_size must be greater than zero")]
    ZeroBufferSize,

    /// IO error while reading a configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
