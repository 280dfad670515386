use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use quiz_core::model::{ResultId, StoredResult};
use storage::repository::{QuestionRepository, ResultRepository};

use crate::Clock;
use crate::error::StatsError;

/// Number of entries on the leaderboard.
pub const DEFAULT_TOP_SCORES: u32 = 10;

const HISTORY_LIMIT: u32 = u32::MAX;

/// Headline numbers for the statistics screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuizStatistics {
    pub total_questions: u64,
    pub total_quizzes: u64,
    /// Mean percentage score, `0.0` before any quiz has been completed.
    pub average_score: f64,
}

#[derive(Serialize)]
struct ResultsExport<'a> {
    exported_at: DateTime<Utc>,
    results: &'a [StoredResult],
}

/// Read-side reporting plus the destructive maintenance actions.
#[derive(Clone)]
pub struct StatsService {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
    results: Arc<dyn ResultRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionRepository>,
        results: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            clock,
            questions,
            results,
        }
    }

    /// # Errors
    ///
    /// Returns `StatsError::Storage` if any aggregate query fails.
    pub async fn statistics(&self) -> Result<QuizStatistics, StatsError> {
        let total_questions = self.questions.count_questions().await?;
        let total_quizzes = self.results.count_results().await?;
        let average_score = self.results.average_score().await?.unwrap_or(0.0);
        Ok(QuizStatistics {
            total_questions,
            total_quizzes,
            average_score,
        })
    }

    /// Best results first; ties keep the earlier result ahead.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` if the query fails.
    pub async fn top_scores(&self, limit: u32) -> Result<Vec<StoredResult>, StatsError> {
        Ok(self.results.top_scores(limit).await?)
    }

    /// All results newest first, optionally restricted to one category label.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` if the query fails.
    pub async fn history(&self, category: Option<&str>) -> Result<Vec<StoredResult>, StatsError> {
        Ok(self.results.list_results(category, HISTORY_LIMIT).await?)
    }

    /// # Errors
    ///
    /// Returns `StatsError::Storage` (including `NotFound`) on failure.
    pub async fn result(&self, id: ResultId) -> Result<StoredResult, StatsError> {
        Ok(self.results.get_result(id).await?)
    }

    /// # Errors
    ///
    /// Returns `StatsError::Storage` (including `NotFound`) on failure.
    pub async fn delete_result(&self, id: ResultId) -> Result<(), StatsError> {
        self.results.delete_result(id).await?;
        tracing::debug!(result_id = %id, "result deleted");
        Ok(())
    }

    /// Delete every stored result. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` if the delete fails.
    pub async fn clear_results(&self) -> Result<u64, StatsError> {
        let removed = self.results.delete_all_results().await?;
        tracing::info!(removed, "results cleared");
        Ok(removed)
    }

    /// Delete all questions and results.
    ///
    /// Returns `(questions_removed, results_removed)`.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` if either delete fails.
    pub async fn reset_all(&self) -> Result<(u64, u64), StatsError> {
        let results = self.results.delete_all_results().await?;
        let questions = self.questions.delete_all_questions().await?;
        tracing::info!(questions, results, "all quiz data reset");
        Ok((questions, results))
    }

    /// Pretty-printed JSON of every result, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` if loading fails.
    /// Returns `StatsError::Export` if encoding fails.
    pub async fn export_json(&self) -> Result<String, StatsError> {
        let results = self.history(None).await?;
        let export = ResultsExport {
            exported_at: self.clock.now(),
            results: &results,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{
        AnswerSlot, Category, Difficulty, Performance, QuestionDraft, QuizResult,
    };
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryRepository;

    fn result(correct: u32, total: u32, category: &str, minutes: i64) -> QuizResult {
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

    async fn service() -> (StatsService, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let stats = StatsService::new(fixed_clock(), repo.clone(), repo.clone());
        (stats, repo)
    }

    #[tokio::test]
    async fn statistics_default_to_zero() {
        let (stats, _repo) = service().await;
        let summary = stats.statistics().await.unwrap();
        assert_eq!(summary.total_questions, 0);
        assert_eq!(summary.total_quizzes, 0);
        assert_eq!(summary.average_score, 0.0);
    }

    #[tokio::test]
    async fn statistics_aggregate_results_and_questions() {
        let (stats, repo) = service().await;
        let draft = QuestionDraft::new(
            "p",
            ["a", "b", "c", "d"].map(String::from),
            AnswerSlot::A,
            Category::new("Art").unwrap(),
            Difficulty::Easy,
        )
        .unwrap();
        repo.insert_question(&draft, fixed_now()).await.unwrap();
        repo.append_result(&result(1, 2, "Art", 0)).await.unwrap();
        repo.append_result(&result(4, 4, "Art", 1)).await.unwrap();

        let summary = stats.statistics().await.unwrap();
        assert_eq!(summary.total_questions, 1);
        assert_eq!(summary.total_quizzes, 2);
        assert!((summary.average_score - 75.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn top_scores_and_history_ordering() {
        let (stats, repo) = service().await;
        let low = repo.append_result(&result(1, 4, "Art", 0)).await.unwrap();
        let high = repo.append_result(&result(4, 4, "Sports", 1)).await.unwrap();
        let mid = repo.append_result(&result(3, 4, "Art", 2)).await.unwrap();

        let top: Vec<ResultId> = stats
            .top_scores(DEFAULT_TOP_SCORES)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(top, vec![high, mid, low]);

        let art: Vec<ResultId> = stats
            .history(Some("Art"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(art, vec![mid, low]);

        let best = stats.result(high).await.unwrap();
        assert_eq!(best.result.performance(), Performance::Excellent);
    }

    #[tokio::test]
    async fn clear_and_reset_remove_data() {
        let (stats, repo) = service().await;
        repo.append_result(&result(1, 2, "Art", 0)).await.unwrap();
        repo.append_result(&result(2, 2, "Art", 1)).await.unwrap();
        assert_eq!(stats.clear_results().await.unwrap(), 2);

        let draft = QuestionDraft::new(
            "p",
            ["a", "b", "c", "d"].map(String::from),
            AnswerSlot::A,
            Category::new("Art").unwrap(),
            Difficulty::Easy,
        )
        .unwrap();
        repo.insert_question(&draft, fixed_now()).await.unwrap();
        repo.append_result(&result(1, 2, "Art", 2)).await.unwrap();
        assert_eq!(stats.reset_all().await.unwrap(), (1, 1));
        assert_eq!(stats.statistics().await.unwrap().total_questions, 0);
    }

    #[tokio::test]
    async fn export_contains_scores() {
        let (stats, repo) = service().await;
        let id = repo.append_result(&result(1, 2, "Science", 0)).await.unwrap();

        let json = stats.export_json().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let results = value["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"], serde_json::json!(id.value()));
        assert_eq!(results[0]["score"], serde_json::json!(50.0));
        assert_eq!(results[0]["category"], "Science");
    }
}
