//! Error types for kubepilot-search

use thiserror::Error;

/// Error type for retrieval index operations
#[derive(Error, Debug)]
pub enum Error {
    /// Index operation failed
    #[error("Index error: {0}")]
    Index(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: usize,
        /// Actual dimensions
        actual: usize,
    },

    /// The index has no chunks to search
    #[error("index is empty")]
    Empty,

    /// Source document could not be fetched or decoded
    #[error("Source error: {0}")]
    Source(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for retrieval index operations
pub type Result<T> = std::result::Result<T, Error>;
