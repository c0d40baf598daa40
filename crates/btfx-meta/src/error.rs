//! Error types for metadata extraction.

use thiserror::Error;

/// Errors that can occur when parsing or writing metadata.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] btfx_common::Error),

    /// XML parsing error.
    #[error("XML error: {0}")]
    Xml(String),
}

/// Result type for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;
