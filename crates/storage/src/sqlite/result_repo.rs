use quiz_core::model::{QuizResult, ResultId, StoredResult};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, count_from_i64, id_to_i64, map_result_row, result_id_from_i64, ser};
use crate::feed::RecordKind;
use crate::repository::{ResultRepository, StorageError};

const RESULT_COLUMNS: &str = r"
    id, total_questions, correct_answers, score, category, difficulty,
    completed_at, elapsed_ms
";

fn map_rows(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<StoredResult>, StorageError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(map_result_row(&row)?);
    }
    Ok(out)
}

#[async_trait::async_trait]
impl ResultRepository for SqliteRepository {
    async fn append_result(&self, result: &QuizResult) -> Result<ResultId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_results (
                    total_questions, correct_answers, score, category, difficulty,
                    completed_at, elapsed_ms
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(i64::from(result.total_questions()))
        .bind(i64::from(result.correct_answers()))
        .bind(result.score())
        .bind(result.category())
        .bind(result.difficulty())
        .bind(result.completed_at())
        .bind(result.elapsed().num_milliseconds())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let id = result_id_from_i64(res.last_insert_rowid())?;
        tracing::debug!(%id, score = result.score(), "quiz result appended");
        self.changes.notify(RecordKind::Results);
        Ok(id)
    }

    async fn get_result(&self, id: ResultId) -> Result<StoredResult, StorageError> {
        let sql = format!("SELECT {RESULT_COLUMNS} FROM quiz_results WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_to_i64("result_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        map_result_row(&row)
    }

    async fn list_results(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<Vec<StoredResult>, StorageError> {
        let mut sql = format!("SELECT {RESULT_COLUMNS} FROM quiz_results");

        let mut bind_index = 1;
        if category.is_some() {
            sql.push_str(" WHERE category = ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        sql.push_str(" ORDER BY completed_at DESC, id DESC");
        sql.push_str(" LIMIT ?");
        sql.push_str(&bind_index.to_string());

        let mut query = sqlx::query(&sql);
        if let Some(category) = category {
            query = query.bind(category);
        }
        query = query.bind(i64::from(limit));

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;
        map_rows(rows)
    }

    async fn top_scores(&self, limit: u32) -> Result<Vec<StoredResult>, StorageError> {
        let sql = format!(
            "SELECT {RESULT_COLUMNS} FROM quiz_results ORDER BY score DESC, id ASC LIMIT ?1"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        map_rows(rows)
    }

    async fn delete_result(&self, id: ResultId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM quiz_results WHERE id = ?1")
            .bind(id_to_i64("result_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        self.changes.notify(RecordKind::Results);
        Ok(())
    }

    async fn delete_all_results(&self) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM quiz_results")
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        self.changes.notify(RecordKind::Results);
        Ok(res.rows_affected())
    }

    async fn count_results(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM quiz_results")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        count_from_i64(row.try_get::<i64, _>("n").map_err(ser)?)
    }

    async fn average_score(&self) -> Result<Option<f64>, StorageError> {
        let row = sqlx::query("SELECT AVG(score) AS avg FROM quiz_results")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        row.try_get::<Option<f64>, _>("avg").map_err(ser)
    }
}
