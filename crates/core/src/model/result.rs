use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::ResultId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("a quiz result needs at least one question")]
    NoQuestions,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    TooManyCorrect { correct: u32, total: u32 },

    #[error("elapsed time cannot be negative")]
    NegativeElapsed,
}

//
// ─── QUIZ RESULT ───────────────────────────────────────────────────────────────
//

/// Outcome of one completed quiz session.
///
/// The percentage score is always derived from the counts, so a stored result
/// can never disagree with its own tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResultFields", into = "ResultFields")]
pub struct QuizResult {
    total_questions: u32,
    correct_answers: u32,
    category: String,
    difficulty: String,
    completed_at: DateTime<Utc>,
    elapsed: Duration,
}

impl QuizResult {
    /// Build a result from session counts.
    ///
    /// `elapsed` is truncated to whole milliseconds, the precision results are
    /// stored with.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError` if there are no questions, more correct answers
    /// than questions, or a negative elapsed duration.
    pub fn new(
        total_questions: u32,
        correct_answers: u32,
        category: impl Into<String>,
        difficulty: impl Into<String>,
        completed_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Result<Self, QuizResultError> {
        if total_questions == 0 {
            return Err(QuizResultError::NoQuestions);
        }
        if correct_answers > total_questions {
            return Err(QuizResultError::TooManyCorrect {
                correct: correct_answers,
                total: total_questions,
            });
        }
        if elapsed < Duration::zero() {
            return Err(QuizResultError::NegativeElapsed);
        }

        Ok(Self {
            total_questions,
            correct_answers,
            category: category.into(),
            difficulty: difficulty.into(),
            completed_at,
            elapsed: Duration::milliseconds(elapsed.num_milliseconds()),
        })
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    /// Percentage score in `0.0..=100.0`.
    #[must_use]
    pub fn score(&self) -> f64 {
        f64::from(self.correct_answers) / f64::from(self.total_questions) * 100.0
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.completed_at - self.elapsed
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn performance(&self) -> Performance {
        Performance::from_score(self.score())
    }
}

/// A persisted result together with its storage id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: ResultId,
    #[serde(flatten)]
    pub result: QuizResult,
}

impl StoredResult {
    #[must_use]
    pub fn new(id: ResultId, result: QuizResult) -> Self {
        Self { id, result }
    }
}

#[derive(Serialize, Deserialize)]
struct ResultFields {
    total_questions: u32,
    correct_answers: u32,
    score: f64,
    category: String,
    difficulty: String,
    completed_at: DateTime<Utc>,
    elapsed_ms: i64,
}

impl From<QuizResult> for ResultFields {
    fn from(value: QuizResult) -> Self {
        Self {
            score: value.score(),
            total_questions: value.total_questions,
            correct_answers: value.correct_answers,
            category: value.category,
            difficulty: value.difficulty,
            completed_at: value.completed_at,
            elapsed_ms: value.elapsed.num_milliseconds(),
        }
    }
}

impl TryFrom<ResultFields> for QuizResult {
    type Error = QuizResultError;

    // `score` is informational in exports; it is always recomputed.
    fn try_from(value: ResultFields) -> Result<Self, Self::Error> {
        QuizResult::new(
            value.total_questions,
            value.correct_answers,
            value.category,
            value.difficulty,
            value.completed_at,
            Duration::milliseconds(value.elapsed_ms),
        )
    }
}

//
// ─── PERFORMANCE ───────────────────────────────────────────────────────────────
//

/// Coarse rating shown alongside a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    Excellent,
    Great,
    Good,
    NotBad,
    KeepTrying,
}

impl Performance {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 80.0 {
            Self::Great
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 60.0 {
            Self::NotBad
        } else {
            Self::KeepTrying
        }
    }

    #[must_use]
    pub fn headline(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent!",
            Self::Great => "Great Job!",
            Self::Good => "Good Work!",
            Self::NotBad => "Not Bad!",
            Self::KeepTrying => "Keep Trying!",
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.headline())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn result(total: u32, correct: u32) -> QuizResult {
        QuizResult::new(
            total,
            correct,
            "Science",
            "All",
            fixed_now(),
            Duration::seconds(42),
        )
        .unwrap()
    }

    #[test]
    fn score_is_exact_percentage() {
        assert_eq!(result(2, 1).score(), 50.0);
        assert_eq!(result(10, 10).score(), 100.0);
        assert_eq!(result(3, 0).score(), 0.0);
        assert_eq!(result(3, 1).score(), 1.0 / 3.0 * 100.0);
    }

    #[test]
    fn elapsed_is_kept_to_the_millisecond() {
        let result =
            QuizResult::new(4, 3, "Art", "Hard", fixed_now(), Duration::microseconds(1_500))
                .unwrap();
        assert_eq!(result.elapsed(), Duration::milliseconds(1));

        let json = serde_json::to_string(&result).unwrap();
        let back: QuizResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn rejects_inconsistent_counts() {
        let now = fixed_now();
        assert_eq!(
            QuizResult::new(0, 0, "All", "All", now, Duration::zero()),
            Err(QuizResultError::NoQuestions)
        );
        assert_eq!(
            QuizResult::new(2, 3, "All", "All", now, Duration::zero()),
            Err(QuizResultError::TooManyCorrect {
                correct: 3,
                total: 2
            })
        );
        assert_eq!(
            QuizResult::new(2, 1, "All", "All", now, Duration::seconds(-1)),
            Err(QuizResultError::NegativeElapsed)
        );
    }

    #[test]
    fn started_at_subtracts_elapsed() {
        let r = result(2, 1);
        assert_eq!(r.started_at(), fixed_now() - Duration::seconds(42));
    }

    #[test]
    fn performance_bands_follow_score() {
        assert_eq!(Performance::from_score(95.0), Performance::Excellent);
        assert_eq!(Performance::from_score(90.0), Performance::Excellent);
        assert_eq!(Performance::from_score(80.0), Performance::Great);
        assert_eq!(Performance::from_score(75.0), Performance::Good);
        assert_eq!(Performance::from_score(60.0), Performance::NotBad);
        assert_eq!(Performance::from_score(59.9), Performance::KeepTrying);
        assert_eq!(result(2, 1).performance().headline(), "Keep Trying!");
    }

    #[test]
    fn serialized_result_carries_score_and_rejects_bad_counts() {
        let stored = StoredResult::new(ResultId::new(3), result(4, 3));
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["score"], 75.0);
        assert_eq!(json["elapsed_ms"], 42_000);

        let back: StoredResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, stored);

        let bad = serde_json::json!({
            "total_questions": 1,
            "correct_answers": 2,
            "score": 200.0,
            "category": "All",
            "difficulty": "All",
            "completed_at": "2023-11-14T22:13:20Z",
            "elapsed_ms": 0
        });
        assert!(serde_json::from_value::<QuizResult>(bad).is_err());
    }
}
