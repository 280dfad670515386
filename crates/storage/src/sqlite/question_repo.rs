use chrono::{DateTime, Utc};
use quiz_core::model::{Category, Question, QuestionDraft, QuestionFilter, QuestionId};
use sqlx::{Row, Sqlite, SqliteConnection};

use super::SqliteRepository;
use super::mapping::{conn, count_from_i64, id_to_i64, map_question_row, question_id_from_i64, ser};
use crate::feed::RecordKind;
use crate::repository::{QuestionRepository, StorageError};

const QUESTION_COLUMNS: &str = r"
    id, prompt, option_a, option_b, option_c, option_d,
    correct_option, category, difficulty, created_at
";

async fn insert_draft(
    executor: &mut SqliteConnection,
    draft: &QuestionDraft,
    created_at: DateTime<Utc>,
) -> Result<QuestionId, StorageError> {
    let [a, b, c, d] = draft.options();
    let res = sqlx::query::<Sqlite>(
        r"
        INSERT INTO questions (
            prompt, option_a, option_b, option_c, option_d,
            correct_option, category, difficulty, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ",
    )
    .bind(draft.prompt())
    .bind(a.as_str())
    .bind(b.as_str())
    .bind(c.as_str())
    .bind(d.as_str())
    .bind(draft.correct().as_str())
    .bind(draft.category().as_str())
    .bind(draft.difficulty().as_str())
    .bind(created_at)
    .execute(executor)
    .await
    .map_err(conn)?;

    question_id_from_i64(res.last_insert_rowid())
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_question(
        &self,
        draft: &QuestionDraft,
        created_at: DateTime<Utc>,
    ) -> Result<QuestionId, StorageError> {
        let mut connection = self.pool.acquire().await.map_err(conn)?;
        let id = insert_draft(&mut connection, draft, created_at).await?;
        tracing::debug!(%id, category = %draft.category(), "question inserted");
        self.changes.notify(RecordKind::Questions);
        Ok(id)
    }

    async fn insert_questions(
        &self,
        drafts: &[QuestionDraft],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<QuestionId>, StorageError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await.map_err(conn)?;
        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            ids.push(insert_draft(&mut tx, draft, created_at).await?);
        }
        tx.commit().await.map_err(conn)?;

        tracing::debug!(count = ids.len(), "questions inserted");
        self.changes.notify(RecordKind::Questions);
        Ok(ids)
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let [a, b, c, d] = question.options();
        sqlx::query(
            r"
            INSERT INTO questions (
                id, prompt, option_a, option_b, option_c, option_d,
                correct_option, category, difficulty, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                prompt = excluded.prompt,
                option_a = excluded.option_a,
                option_b = excluded.option_b,
                option_c = excluded.option_c,
                option_d = excluded.option_d,
                correct_option = excluded.correct_option,
                category = excluded.category,
                difficulty = excluded.difficulty
            ",
        )
        .bind(id_to_i64("question_id", question.id().value())?)
        .bind(question.prompt())
        .bind(a.as_str())
        .bind(b.as_str())
        .bind(c.as_str())
        .bind(d.as_str())
        .bind(question.correct().as_str())
        .bind(question.category().as_str())
        .bind(question.difficulty().as_str())
        .bind(question.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        self.changes.notify(RecordKind::Questions);
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_to_i64("question_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_question_row).transpose()
    }

    async fn list_questions(
        &self,
        filter: &QuestionFilter,
    ) -> Result<Vec<Question>, StorageError> {
        let mut sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE 1 = 1");

        let mut bind_index = 1;
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        if filter.difficulty.is_some() {
            sql.push_str(" AND difficulty = ?");
            sql.push_str(&bind_index.to_string());
        }
        sql.push_str(" ORDER BY id ASC");

        let mut query = sqlx::query(&sql);
        if let Some(category) = &filter.category {
            query = query.bind(category.as_str());
        }
        if let Some(difficulty) = filter.difficulty {
            query = query.bind(difficulty.as_str());
        }

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;
        tracing::debug!(%filter, rows = rows.len(), "questions listed");

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_question_row(&row)?);
        }
        Ok(out)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM questions WHERE id = ?1")
            .bind(id_to_i64("question_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        self.changes.notify(RecordKind::Questions);
        Ok(())
    }

    async fn delete_all_questions(&self) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM questions")
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        self.changes.notify(RecordKind::Questions);
        Ok(res.rows_affected())
    }

    async fn count_questions(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM questions")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        count_from_i64(row.try_get::<i64, _>("n").map_err(ser)?)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let rows = sqlx::query("SELECT DISTINCT category FROM questions ORDER BY category ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let label: String = row.try_get("category").map_err(ser)?;
            out.push(Category::new(label).map_err(ser)?);
        }
        Ok(out)
    }
}
