//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::DocumentError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the quiz backend client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("invalid article url: {0}")]
    InvalidUrl(String),
    #[error("quiz not found")]
    NotFound,
    #[error("quiz backend returned {status}: {detail}")]
    Status {
        status: reqwest::StatusCode,
        detail: String,
    },
    #[error("quiz backend sent an unusable quiz: {0}")]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// True when the backend could not be reached or did not answer in time,
    /// as opposed to answering with an error.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

/// Errors emitted by `QuizLibraryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LibraryError {
    #[error("article rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
