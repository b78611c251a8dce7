//! Unified error types and result handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Backend responded with status {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("Article not found: {uuid}")]
    ArticleNotFound { uuid: String },

    #[error("Unknown field name: {name}")]
    InvalidFieldName { name: String },

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("The article was already saved")]
    AlreadySaved,

    #[error("Article list unavailable: {message}")]
    ListUnavailable { message: String },

    #[error("Could not delete article {uuid}: {message}")]
    DeleteFailed { uuid: String, message: String },

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
