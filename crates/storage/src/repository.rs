use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    Category, Question, QuestionDraft, QuestionFilter, QuestionId, QuizResult, ResultId,
    StoredResult,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::feed::{ChangeFeed, RecordKind};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for question records.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a new question and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn insert_question(
        &self,
        draft: &QuestionDraft,
        created_at: DateTime<Utc>,
    ) -> Result<QuestionId, StorageError>;

    /// Insert several questions atomically, returning ids in input order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any question cannot be stored; nothing is
    /// written in that case.
    async fn insert_questions(
        &self,
        drafts: &[QuestionDraft],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<QuestionId>, StorageError>;

    /// Persist a question under its own id, replacing any existing record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Fetch a question by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// List questions matching the filter, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_questions(&self, filter: &QuestionFilter)
    -> Result<Vec<Question>, StorageError>;

    /// Delete a question by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question does not exist.
    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError>;

    /// Delete every question, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_all_questions(&self) -> Result<u64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_questions(&self) -> Result<u64, StorageError>;

    /// Distinct categories present in the store, sorted by label.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_categories(&self) -> Result<Vec<Category>, StorageError>;
}

/// Repository contract for completed quiz results.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Append a result and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: &QuizResult) -> Result<ResultId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_result(&self, id: ResultId) -> Result<StoredResult, StorageError>;

    /// Results newest first, optionally restricted to a category label.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_results(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<Vec<StoredResult>, StorageError>;

    /// Results ordered by score (highest first), ties broken by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn top_scores(&self, limit: u32) -> Result<Vec<StoredResult>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the result does not exist.
    async fn delete_result(&self, id: ResultId) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_all_results(&self) -> Result<u64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_results(&self) -> Result<u64, StorageError>;

    /// Mean score across all results, `None` when there are none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn average_score(&self) -> Result<Option<f64>, StorageError>;
}

pub(crate) fn cmp_top_scores(a: &StoredResult, b: &StoredResult) -> Ordering {
    b.result
        .score()
        .total_cmp(&a.result.score())
        .then_with(|| a.id.cmp(&b.id))
}

pub(crate) fn cmp_newest_first(a: &StoredResult, b: &StoredResult) -> Ordering {
    b.result
        .completed_at()
        .cmp(&a.result.completed_at())
        .then_with(|| b.id.cmp(&a.id))
}

fn limit_len(limit: u32) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

#[derive(Default)]
struct InMemoryState {
    questions: BTreeMap<QuestionId, Question>,
    next_question_id: u64,
    results: BTreeMap<ResultId, QuizResult>,
    next_result_id: u64,
}

impl InMemoryState {
    fn allocate_question_id(&mut self) -> QuestionId {
        self.next_question_id += 1;
        QuestionId::new(self.next_question_id)
    }

    fn allocate_result_id(&mut self) -> ResultId {
        self.next_result_id += 1;
        ResultId::new(self.next_result_id)
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
    changes: ChangeFeed,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn changes(&self) -> ChangeFeed {
        self.changes.clone()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_question(
        &self,
        draft: &QuestionDraft,
        created_at: DateTime<Utc>,
    ) -> Result<QuestionId, StorageError> {
        let id = {
            let mut guard = self.lock()?;
            let id = guard.allocate_question_id();
            guard
                .questions
                .insert(id, draft.clone().into_question(id, created_at));
            id
        };
        self.changes.notify(RecordKind::Questions);
        Ok(id)
    }

    async fn insert_questions(
        &self,
        drafts: &[QuestionDraft],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<QuestionId>, StorageError> {
        let ids = {
            let mut guard = self.lock()?;
            let mut ids = Vec::with_capacity(drafts.len());
            for draft in drafts {
                let id = guard.allocate_question_id();
                guard
                    .questions
                    .insert(id, draft.clone().into_question(id, created_at));
                ids.push(id);
            }
            ids
        };
        if !ids.is_empty() {
            self.changes.notify(RecordKind::Questions);
        }
        Ok(ids)
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        {
            let mut guard = self.lock()?;
            let id = question.id();
            guard.next_question_id = guard.next_question_id.max(id.value());
            guard.questions.insert(id, question.clone());
        }
        self.changes.notify(RecordKind::Questions);
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.questions.get(&id).cloned())
    }

    async fn list_questions(
        &self,
        filter: &QuestionFilter,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .questions
            .values()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        self.lock()?
            .questions
            .remove(&id)
            .ok_or(StorageError::NotFound)?;
        self.changes.notify(RecordKind::Questions);
        Ok(())
    }

    async fn delete_all_questions(&self) -> Result<u64, StorageError> {
        let removed = {
            let mut guard = self.lock()?;
            let removed = guard.questions.len();
            guard.questions.clear();
            removed
        };
        self.changes.notify(RecordKind::Questions);
        Ok(removed as u64)
    }

    async fn count_questions(&self) -> Result<u64, StorageError> {
        Ok(self.lock()?.questions.len() as u64)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let guard = self.lock()?;
        let unique: BTreeSet<Category> = guard
            .questions
            .values()
            .map(|q| q.category().clone())
            .collect();
        Ok(unique.into_iter().collect())
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &QuizResult) -> Result<ResultId, StorageError> {
        let id = {
            let mut guard = self.lock()?;
            let id = guard.allocate_result_id();
            guard.results.insert(id, result.clone());
            id
        };
        self.changes.notify(RecordKind::Results);
        Ok(id)
    }

    async fn get_result(&self, id: ResultId) -> Result<StoredResult, StorageError> {
        let guard = self.lock()?;
        guard
            .results
            .get(&id)
            .map(|r| StoredResult::new(id, r.clone()))
            .ok_or(StorageError::NotFound)
    }

    async fn list_results(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<Vec<StoredResult>, StorageError> {
        let guard = self.lock()?;
        let mut out: Vec<StoredResult> = guard
            .results
            .iter()
            .filter(|(_, r)| category.is_none_or(|c| r.category() == c))
            .map(|(id, r)| StoredResult::new(*id, r.clone()))
            .collect();
        out.sort_by(cmp_newest_first);
        out.truncate(limit_len(limit));
        Ok(out)
    }

    async fn top_scores(&self, limit: u32) -> Result<Vec<StoredResult>, StorageError> {
        let guard = self.lock()?;
        let mut out: Vec<StoredResult> = guard
            .results
            .iter()
            .map(|(id, r)| StoredResult::new(*id, r.clone()))
            .collect();
        out.sort_by(cmp_top_scores);
        out.truncate(limit_len(limit));
        Ok(out)
    }

    async fn delete_result(&self, id: ResultId) -> Result<(), StorageError> {
        self.lock()?
            .results
            .remove(&id)
            .ok_or(StorageError::NotFound)?;
        self.changes.notify(RecordKind::Results);
        Ok(())
    }

    async fn delete_all_results(&self) -> Result<u64, StorageError> {
        let removed = {
            let mut guard = self.lock()?;
            let removed = guard.results.len();
            guard.results.clear();
            removed
        };
        self.changes.notify(RecordKind::Results);
        Ok(removed as u64)
    }

    async fn count_results(&self) -> Result<u64, StorageError> {
        Ok(self.lock()?.results.len() as u64)
    }

    async fn average_score(&self) -> Result<Option<f64>, StorageError> {
        let guard = self.lock()?;
        if guard.results.is_empty() {
            return Ok(None);
        }
        let sum: f64 = guard.results.values().map(QuizResult::score).sum();
        #[allow(clippy::cast_precision_loss)]
        let avg = sum / guard.results.len() as f64;
        Ok(Some(avg))
    }
}

/// Aggregates the record repositories and their change feed behind trait
/// objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub changes: ChangeFeed,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let changes = repo.changes();
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let results: Arc<dyn ResultRepository> = Arc::new(repo);
        Self {
            questions,
            results,
            changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{AnswerSlot, Difficulty};
    use quiz_core::time::fixed_now;

    fn draft(prompt: &str, category: &str, difficulty: Difficulty) -> QuestionDraft {
        QuestionDraft::new(
            prompt,
            ["a", "b", "c", "d"].map(String::from),
            AnswerSlot::B,
            Category::new(category).unwrap(),
            difficulty,
        )
        .unwrap()
    }

    fn result(total: u32, correct: u32, category: &str, minutes: i64) -> QuizResult {
        QuizResult::new(
            total,
            correct,
            category,
            "All",
            fixed_now() + Duration::minutes(minutes),
            Duration::seconds(30),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn filters_questions_by_category_and_difficulty() {
        let repo = InMemoryRepository::new();
        repo.insert_questions(
            &[
                draft("Q1", "Science", Difficulty::Easy),
                draft("Q2", "Science", Difficulty::Hard),
                draft("Q3", "History", Difficulty::Easy),
            ],
            fixed_now(),
        )
        .await
        .unwrap();

        let science = QuestionFilter::from_labels("Science", "All").unwrap();
        assert_eq!(repo.list_questions(&science).await.unwrap().len(), 2);

        let easy = QuestionFilter::from_labels("All", "Easy").unwrap();
        let easy = repo.list_questions(&easy).await.unwrap();
        assert_eq!(
            easy.iter().map(Question::prompt).collect::<Vec<_>>(),
            vec!["Q1", "Q3"]
        );

        let categories = repo.list_categories().await.unwrap();
        assert_eq!(
            categories.iter().map(Category::as_str).collect::<Vec<_>>(),
            vec!["History", "Science"]
        );
        assert_eq!(repo.count_questions().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn upsert_keeps_id_allocation_ahead() {
        let repo = InMemoryRepository::new();
        let q = draft("Q", "Art", Difficulty::Medium).into_question(QuestionId::new(41), fixed_now());
        repo.upsert_question(&q).await.unwrap();

        let id = repo
            .insert_question(&draft("Next", "Art", Difficulty::Easy), fixed_now())
            .await
            .unwrap();
        assert_eq!(id, QuestionId::new(42));
    }

    #[tokio::test]
    async fn deleting_missing_records_is_not_found() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            repo.delete_question(QuestionId::new(9)).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            repo.delete_result(ResultId::new(9)).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn results_order_and_aggregate() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.average_score().await.unwrap(), None);

        let low = repo.append_result(&result(4, 1, "Science", 0)).await.unwrap();
        let high = repo.append_result(&result(4, 4, "History", 1)).await.unwrap();
        let mid = repo.append_result(&result(4, 2, "Science", 2)).await.unwrap();

        let newest: Vec<_> = repo
            .list_results(None, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(newest, vec![mid, high, low]);

        let science: Vec<_> = repo
            .list_results(Some("Science"), 1)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(science, vec![mid]);

        let top: Vec<_> = repo
            .top_scores(2)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(top, vec![high, mid]);

        assert_eq!(repo.count_results().await.unwrap(), 3);
        let avg = repo.average_score().await.unwrap().unwrap();
        assert!((avg - (25.0 + 100.0 + 50.0) / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn writes_publish_changes() {
        let repo = InMemoryRepository::new();
        let feed = repo.changes();
        repo.append_result(&result(1, 1, "Art", 0)).await.unwrap();
        assert_eq!(feed.revision(RecordKind::Results), 1);
        assert_eq!(feed.revision(RecordKind::Questions), 0);

        repo.insert_questions(&[], fixed_now()).await.unwrap();
        assert_eq!(feed.revision(RecordKind::Questions), 0);

        repo.delete_all_results().await.unwrap();
        assert_eq!(feed.revision(RecordKind::Results), 2);
    }
}
