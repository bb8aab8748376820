use std::path::PathBuf;

use alloy_primitives::hex::FromHexError;

/// Errors of command line input handling
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Failed to read file
    #[error("Failed to read {path}: {source}")]
    FileRead {
        /// The file
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// Failed to write file
    #[error("Failed to write {path}: {source}")]
    FileWrite {
        /// The file
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// Failed to read stdin
    #[error("Failed to read stdin: {0}")]
    Stdin(#[source] std::io::Error),

    /// Invalid hex string
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] FromHexError),

    /// Invalid deployment record
    #[error("Invalid deployment record: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failed to set up logging
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Result type for command line input handling
pub type Result<T> = std::result::Result<T, CliError>;
