//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{FilterError, QuestionError, QuizResultError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the quiz session controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available")]
    Empty,
    #[error("session is not completed")]
    NotCompleted,
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Result(#[from] QuizResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuestionBankService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionBankError {
    #[error("invalid import file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("question #{index} in import: {reason}")]
    InvalidImport { index: usize, reason: String },
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    #[error("failed to encode results: {0}")]
    Export(#[from] serde_json::Error),
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
    QuestionBank(#[from] QuestionBankError),
}
