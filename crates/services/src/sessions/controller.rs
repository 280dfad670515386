use std::sync::Arc;

use quiz_core::model::{
    AnswerSlot, Question, QuestionFilter, QuizResult, ResultId, StoredResult,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::repository::{QuestionRepository, ResultRepository};

use super::progress::SessionProgress;
use super::quiz::{AnsweredQuestion, QuizSession};
use super::selection::sample_questions;
use crate::Clock;
use crate::error::SessionError;

/// Upper bound on questions drawn into a single quiz.
pub const MAX_QUESTIONS_PER_SESSION: usize = 10;

/// Coarse lifecycle of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
    Completed,
}

/// Outcome of a single `submit_answer` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// No quiz was running; nothing changed.
    Ignored,
    /// The answer was graded and the next question is up.
    Advanced {
        answer: AnsweredQuestion,
        progress: SessionProgress,
    },
    /// The last question was answered and the result persisted.
    Completed {
        answer: AnsweredQuestion,
        result: StoredResult,
    },
}

struct CompletedQuiz {
    session: QuizSession,
    result: QuizResult,
    result_id: Option<ResultId>,
}

#[derive(Default)]
enum State {
    #[default]
    Idle,
    Active(QuizSession),
    Completed(CompletedQuiz),
}

/// Drives a quiz from question selection through to the persisted result.
///
/// Mutating calls take `&mut self`, so a controller has exactly one owner and
/// overlapping starts or submits cannot interleave.
pub struct SessionController {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
    results: Arc<dyn ResultRepository>,
    rng: StdRng,
    state: State,
}

impl SessionController {
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
            rng: StdRng::from_os_rng(),
            state: State::Idle,
        }
    }

    /// Use a seeded RNG so question selection is reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match self.state {
            State::Idle => SessionPhase::Idle,
            State::Active(_) => SessionPhase::Active,
            State::Completed(_) => SessionPhase::Completed,
        }
    }

    /// The running or just-finished quiz, if any.
    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        match &self.state {
            State::Idle => None,
            State::Active(session) => Some(session),
            State::Completed(done) => Some(&done.session),
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match &self.state {
            State::Active(session) => session.current_question(),
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.session().map(QuizSession::progress)
    }

    /// Result of the quiz that just completed, persisted or not.
    #[must_use]
    pub fn last_result(&self) -> Option<&QuizResult> {
        match &self.state {
            State::Completed(done) => Some(&done.result),
            _ => None,
        }
    }

    /// Store id of the last result, `None` until the write has succeeded.
    #[must_use]
    pub fn last_result_id(&self) -> Option<ResultId> {
        match &self.state {
            State::Completed(done) => done.result_id,
            _ => None,
        }
    }

    /// Start a quiz over questions matching `filter`.
    ///
    /// Any running or completed quiz is replaced.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when nothing matches the filter; the
    /// controller keeps its previous state in that case.
    /// Returns `SessionError::Storage` if loading questions fails.
    pub async fn start(&mut self, filter: QuestionFilter) -> Result<SessionProgress, SessionError> {
        let pool = self.questions.list_questions(&filter).await?;
        if pool.is_empty() {
            tracing::debug!(%filter, "no questions match filter");
            return Err(SessionError::Empty);
        }

        let available = pool.len();
        let selected = sample_questions(pool, MAX_QUESTIONS_PER_SESSION, &mut self.rng);
        let label = filter.to_string();
        let session = QuizSession::new(filter, selected, self.clock.now())?;
        let progress = session.progress();

        tracing::debug!(
            filter = %label,
            available,
            selected = progress.total,
            "quiz started"
        );
        self.state = State::Active(session);
        Ok(progress)
    }

    /// Start a quiz from raw labels, where `"All"` disables a dimension.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Filter` for an unknown difficulty or blank category,
    /// otherwise the same errors as `start`.
    pub async fn start_with_labels(
        &mut self,
        category: &str,
        difficulty: &str,
    ) -> Result<SessionProgress, SessionError> {
        let filter = QuestionFilter::from_labels(category, difficulty)?;
        self.start(filter).await
    }

    /// Grade `choice` against the current question.
    ///
    /// Answering the last question builds the result and appends it to the
    /// result store. If that write fails the controller still moves to
    /// `Completed`, keeps the computed result and returns the storage error;
    /// call `finalize_result` to retry.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persisting the final result fails.
    pub async fn submit_answer(&mut self, choice: AnswerSlot) -> Result<SubmitOutcome, SessionError> {
        let mut session = match std::mem::take(&mut self.state) {
            State::Active(session) => session,
            other => {
                tracing::debug!(?choice, "answer ignored without an active quiz");
                self.state = other;
                return Ok(SubmitOutcome::Ignored);
            }
        };

        let Some(answer) = session.answer(choice, self.clock.now()) else {
            self.state = State::Active(session);
            return Ok(SubmitOutcome::Ignored);
        };

        if !session.is_complete() {
            let progress = session.progress();
            self.state = State::Active(session);
            return Ok(SubmitOutcome::Advanced { answer, progress });
        }

        let result = match session.build_result() {
            Ok(result) => result,
            Err(err) => {
                self.state = State::Active(session);
                return Err(err);
            }
        };
        self.state = State::Completed(CompletedQuiz {
            session,
            result: result.clone(),
            result_id: None,
        });

        let id = self.results.append_result(&result).await.map_err(|err| {
            tracing::warn!(error = %err, "failed to persist quiz result");
            err
        })?;
        if let State::Completed(done) = &mut self.state {
            done.result_id = Some(id);
        }

        tracing::info!(
            result_id = %id,
            correct = result.correct_answers(),
            total = result.total_questions(),
            score = result.score(),
            "quiz completed"
        );
        Ok(SubmitOutcome::Completed {
            answer,
            result: StoredResult::new(id, result),
        })
    }

    /// Retry persisting the result of a completed quiz.
    ///
    /// Returns the stored record without writing again once an id exists.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` unless the controller is `Completed`.
    /// Returns `SessionError::Storage` if the write fails again.
    pub async fn finalize_result(&mut self) -> Result<StoredResult, SessionError> {
        let State::Completed(done) = &mut self.state else {
            return Err(SessionError::NotCompleted);
        };

        if let Some(id) = done.result_id {
            return Ok(StoredResult::new(id, done.result.clone()));
        }

        let id = self.results.append_result(&done.result).await?;
        done.result_id = Some(id);
        tracing::info!(result_id = %id, "quiz result persisted on retry");
        Ok(StoredResult::new(id, done.result.clone()))
    }

    /// Drop any quiz state without persisting anything.
    pub fn reset(&mut self) {
        if !matches!(self.state, State::Idle) {
            tracing::debug!(phase = ?self.phase(), "quiz reset");
        }
        self.state = State::Idle;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{Category, Difficulty, QuestionDraft};
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryRepository;

    async fn seeded_repo(count: usize) -> Arc<InMemoryRepository> {
        let repo = Arc::new(InMemoryRepository::new());
        let drafts: Vec<QuestionDraft> = (0..count)
            .map(|i| {
                QuestionDraft::new(
                    format!("Question {i}"),
                    ["w", "x", "y", "z"].map(String::from),
                    AnswerSlot::B,
                    Category::new("Science").unwrap(),
                    Difficulty::Easy,
                )
                .unwrap()
            })
            .collect();
        repo.insert_questions(&drafts, fixed_now()).await.unwrap();
        repo
    }

    fn controller(repo: &Arc<InMemoryRepository>) -> SessionController {
        SessionController::new(fixed_clock(), repo.clone(), repo.clone()).with_seed(11)
    }

    #[tokio::test]
    async fn start_caps_selection_and_resets_tally() {
        let repo = seeded_repo(14).await;
        let mut ctl = controller(&repo);

        let progress = ctl.start(QuestionFilter::all()).await.unwrap();
        assert_eq!(progress.total, MAX_QUESTIONS_PER_SESSION);
        assert_eq!(ctl.phase(), SessionPhase::Active);

        ctl.submit_answer(AnswerSlot::B).await.unwrap();
        assert_eq!(ctl.progress().unwrap().correct, 1);

        let restarted = ctl.start(QuestionFilter::all()).await.unwrap();
        assert_eq!(restarted.answered, 0);
        assert_eq!(restarted.correct, 0);
        assert_eq!(ctl.session().unwrap().current_index(), 0);
    }

    #[tokio::test]
    async fn elapsed_time_follows_clock() {
        let repo = seeded_repo(2).await;
        let mut ctl = controller(&repo);
        ctl.start(QuestionFilter::all()).await.unwrap();

        ctl.clock.advance(Duration::seconds(20));
        ctl.submit_answer(AnswerSlot::B).await.unwrap();
        ctl.clock.advance(Duration::seconds(45));
        let outcome = ctl.submit_answer(AnswerSlot::A).await.unwrap();

        let SubmitOutcome::Completed { answer, result } = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert!(!answer.is_correct);
        assert_eq!(result.result.elapsed(), Duration::seconds(65));
        assert_eq!(result.result.completed_at(), fixed_now() + Duration::seconds(65));
        assert_eq!(ctl.last_result_id(), Some(result.id));
    }

    #[tokio::test]
    async fn empty_start_keeps_previous_state() {
        let repo = seeded_repo(3).await;
        let mut ctl = controller(&repo);
        ctl.start(QuestionFilter::all()).await.unwrap();

        let history = QuestionFilter::from_labels("History", "All").unwrap();
        assert!(matches!(ctl.start(history).await, Err(SessionError::Empty)));
        assert_eq!(ctl.phase(), SessionPhase::Active);
        assert_eq!(ctl.progress().unwrap().total, 3);
    }

    #[tokio::test]
    async fn reset_discards_without_persisting() {
        let repo = seeded_repo(2).await;
        let mut ctl = controller(&repo);
        ctl.start(QuestionFilter::all()).await.unwrap();
        ctl.submit_answer(AnswerSlot::B).await.unwrap();

        ctl.reset();
        assert_eq!(ctl.phase(), SessionPhase::Idle);
        assert!(ctl.current_question().is_none());
        assert!(ctl.progress().is_none());
        assert_eq!(repo.count_results().await.unwrap(), 0);
        assert_eq!(
            ctl.submit_answer(AnswerSlot::B).await.unwrap(),
            SubmitOutcome::Ignored
        );
    }

    #[tokio::test]
    async fn invalid_labels_surface_filter_error() {
        let repo = seeded_repo(1).await;
        let mut ctl = controller(&repo);
        let err = ctl.start_with_labels("Science", "Impossible").await.unwrap_err();
        assert!(matches!(err, SessionError::Filter(_)));
        assert_eq!(ctl.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn finalize_requires_completion_and_is_idempotent() {
        let repo = seeded_repo(1).await;
        let mut ctl = controller(&repo);
        assert!(matches!(
            ctl.finalize_result().await,
            Err(SessionError::NotCompleted)
        ));

        ctl.start(QuestionFilter::all()).await.unwrap();
        let SubmitOutcome::Completed { result, .. } =
            ctl.submit_answer(AnswerSlot::B).await.unwrap()
        else {
            panic!("single question quiz should complete");
        };

        let again = ctl.finalize_result().await.unwrap();
        assert_eq!(again, result);
        assert_eq!(repo.count_results().await.unwrap(), 1);
    }
}
