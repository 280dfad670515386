use quiz_core::model::{
    AnswerSlot, Difficulty, Question, QuestionId, QuizResult, ResultId, StoredResult,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn result_id_from_i64(v: i64) -> Result<ResultId, StorageError> {
    Ok(ResultId::new(i64_to_u64("result_id", v)?))
}

pub(crate) fn count_from_i64(v: i64) -> Result<u64, StorageError> {
    i64_to_u64("count", v)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let correct: String = row.try_get("correct_option").map_err(ser)?;
    let correct = correct.parse::<AnswerSlot>().map_err(ser)?;
    let difficulty: String = row.try_get("difficulty").map_err(ser)?;
    let difficulty = difficulty.parse::<Difficulty>().map_err(ser)?;

    let options = [
        row.try_get::<String, _>("option_a").map_err(ser)?,
        row.try_get::<String, _>("option_b").map_err(ser)?,
        row.try_get::<String, _>("option_c").map_err(ser)?,
        row.try_get::<String, _>("option_d").map_err(ser)?,
    ];

    Question::from_persisted(
        question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("prompt").map_err(ser)?,
        options,
        correct,
        row.try_get::<String, _>("category").map_err(ser)?,
        difficulty,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

/// Rebuild a stored result. The persisted `score` column only serves ordering
/// and aggregation; the domain value is recomputed from the counts.
pub(crate) fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<StoredResult, StorageError> {
    let id = result_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let total = u32_from_i64(
        "total_questions",
        row.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;
    let correct = u32_from_i64(
        "correct_answers",
        row.try_get::<i64, _>("correct_answers").map_err(ser)?,
    )?;
    let elapsed_ms: i64 = row.try_get("elapsed_ms").map_err(ser)?;

    let result = QuizResult::new(
        total,
        correct,
        row.try_get::<String, _>("category").map_err(ser)?,
        row.try_get::<String, _>("difficulty").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
        chrono::Duration::milliseconds(elapsed_ms),
    )
    .map_err(ser)?;

    Ok(StoredResult::new(id, result))
}
