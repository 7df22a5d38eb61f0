use polars::prelude::PolarsError;
use std::{io, path::PathBuf};
use thiserror::Error;
use tokio::task::JoinError;

/**
Result type to simplify function signatures.

This is a custom result type that uses our custom `GeoMapError` for the error type.

Functions can return `GeoMapResult<T>` and then use `?` to automatically propagate errors.
*/
pub type GeoMapResult<T> = Result<T, GeoMapError>;

/**
Custom error type for GeoMap View.

This enum defines all the possible errors that can occur in the application.

We use the `thiserror` crate to derive the `Error` trait and automatically
implement `Display` using the `#[error(...)]` attribute.
*/
#[derive(Error, Debug)]
pub enum GeoMapError {
    // Wrapper for standard IO errors.
    // The #[from] attribute automatically converts io::Error to GeoMapError::Io.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Wrapper for Polars errors (from the Polars library).
    // #[from] handles conversion. Handles errors from Polars operations,
    // including invalid lazy plans or errors during execution (like bad casts or regex syntax).
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    // Errors encountered while parsing CSV data (e.g., inconsistent columns, invalid data).
    #[error("CSV parsing error: {0}")]
    CsvParsing(String),

    // Errors related to the file type (e.g., unsupported file extension, incorrect file format).
    #[error("File type error: {0}")]
    FileType(String),

    // Wrapper for Tokio JoinErrors, occurring when asynchronous tasks fail.
    #[error("Tokio JoinError: {0}")]
    TokioJoin(#[from] JoinError),

    // Errors occurring when receiving data from asynchronous channels.
    #[error("Channel receive error: {0}")]
    ChannelReceive(String),

    // Indicates that a specified file could not be found, storing the attempted path.
    #[error("File not found: {0:#?}")]
    FileNotFound(PathBuf),

    // Indicates an invalid CSV delimiter was provided (empty or too long).
    #[error("Invalid CSV delimiter: '{0}'")]
    InvalidDelimiter(String),

    // Indicates that a provided file extension or file type are not supported.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Indicates that a column requested for region extraction does not hold strings.
    #[error("Column '{0}' is not a String column and cannot hold region names")]
    NotAStringColumn(String),

    /// Indicates an unknown base-map name (expected world, europe or usa).
    #[error("Unknown map: '{0}' (expected one of: world, europe, usa)")]
    UnknownMap(String),

    // Wrapper for serde_json errors while building rendering-surface payloads.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for command-line argument '{arg_name}': {reason}")]
    InvalidArgument {
        arg_name: String, // Context about *which* argument failed
        reason: String,   // The specific error reason
    },

    // A catch-all for other, less specific errors not covered by specific variants.
    // Uses a String to describe the error. Consider using this sparingly.
    #[error("Other error: {0}")]
    Other(String),
}

// Implementation of the From trait to convert a String into a GeoMapError.
// This allows us to easily convert generic error strings into our custom error type.
impl From<String> for GeoMapError {
    fn from(err: String) -> GeoMapError {
        // Prefer using specific error variants when possible, fallback to Other.
        GeoMapError::Other(err)
    }
}
