use thiserror::Error;

use crate::model::{FilterError, QuestionError, QuizResultError};

/// Umbrella error for domain validation failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Result(#[from] QuizResultError),
    #[error(transparent)]
    Filter(#[from] FilterError),
}
