//! Error types for Libris Core

use thiserror::Error;

/// Result type alias using LibraryError
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Top-level error type for all Library Store operations
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Book not found: {0}")]
    NotFound(String),

    #[error("A book with id {0} already exists")]
    DuplicateId(String),

    #[error("Rating must be between 0 and 5, got {0}")]
    InvalidRating(u8),
}

/// Errors raised while reading an import document
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Document is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Document is not a list of books")]
    NotASequence,
}

/// Errors from the key-value persistence substrate
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the external generative-AI service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Invalid service response: {0}")]
    InvalidResponse(String),

    #[error("Service call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("No API key configured")]
    MissingApiKey,
}

/// Errors from the AI-assisted ingestion flow
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("A search is already in progress")]
    Busy,

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("No preview to act on")]
    NoPreview,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}
