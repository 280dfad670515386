use chrono::{DateTime, Duration, Utc};
use std::fmt;

use quiz_core::model::{AnswerSlot, Question, QuestionFilter, QuestionId, QuizResult};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// Captures how a single question was answered within a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnsweredQuestion {
    pub question_id: QuestionId,
    pub choice: AnswerSlot,
    pub correct_slot: AnswerSlot,
    pub is_correct: bool,
}

//
// ─── QUIZ SESSION ──────────────────────────────────────────────────────────────
//

/// In-memory run through a fixed list of questions.
///
/// Steps through the questions sequentially, keeping a running tally of
/// correct answers. Once the last question is answered the session is
/// complete and further answers are refused.
pub struct QuizSession {
    filter: QuestionFilter,
    questions: Vec<Question>,
    current: usize,
    correct: u32,
    answers: Vec<AnsweredQuestion>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Create a session over the already-selected questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(
        filter: QuestionFilter,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            filter,
            questions,
            current: 0,
            correct: 0,
            answers: Vec::new(),
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn filter(&self) -> &QuestionFilter {
        &self.filter
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[AnsweredQuestion] {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Zero-based index of the question being asked.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            answered: self.answers.len(),
            remaining: self.questions.len().saturating_sub(self.answers.len()),
            correct: self.correct,
            is_complete: self.is_complete(),
        }
    }

    /// Grade `choice` against the current question and advance.
    ///
    /// Returns `None` if the session is already complete.
    pub fn answer(
        &mut self,
        choice: AnswerSlot,
        answered_at: DateTime<Utc>,
    ) -> Option<AnsweredQuestion> {
        let question = self.current_question()?;
        let answer = AnsweredQuestion {
            question_id: question.id(),
            choice,
            correct_slot: question.correct(),
            is_correct: question.is_correct(choice),
        };

        if answer.is_correct {
            self.correct += 1;
        }
        self.answers.push(answer);

        if self.current + 1 >= self.questions.len() {
            self.completed_at = Some(answered_at);
        } else {
            self.current += 1;
        }

        Some(answer)
    }

    /// Build the result for a completed session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` if questions remain unanswered.
    pub fn build_result(&self) -> Result<QuizResult, SessionError> {
        let completed_at = self.completed_at.ok_or(SessionError::NotCompleted)?;
        let elapsed = (completed_at - self.started_at).max(Duration::zero());
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);

        Ok(QuizResult::new(
            total,
            self.correct,
            self.filter.category_label(),
            self.filter.difficulty_label(),
            completed_at,
            elapsed,
        )?)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("filter", &self.filter)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("correct", &self.correct)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Category, Difficulty, QuestionDraft};
    use quiz_core::time::fixed_now;

    fn question(id: u64, correct: AnswerSlot) -> Question {
        QuestionDraft::new(
            format!("Q{id}"),
            ["a", "b", "c", "d"].map(String::from),
            correct,
            Category::new("Science").unwrap(),
            Difficulty::Easy,
        )
        .unwrap()
        .into_question(QuestionId::new(id), fixed_now())
    }

    fn science() -> QuestionFilter {
        QuestionFilter::from_labels("Science", "All").unwrap()
    }

    #[test]
    fn empty_session_returns_error() {
        let err = QuizSession::new(science(), Vec::new(), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn session_advances_and_completes() {
        let mut session = QuizSession::new(
            science(),
            vec![question(1, AnswerSlot::A), question(2, AnswerSlot::B)],
            fixed_now(),
        )
        .unwrap();

        assert_eq!(session.current_question().unwrap().id(), QuestionId::new(1));
        let first = session.answer(AnswerSlot::A, fixed_now()).unwrap();
        assert!(first.is_correct);
        assert!(!session.is_complete());
        assert_eq!(session.current_index(), 1);

        let done_at = fixed_now() + Duration::seconds(30);
        let second = session.answer(AnswerSlot::C, done_at).unwrap();
        assert!(!second.is_correct);
        assert_eq!(second.correct_slot, AnswerSlot::B);
        assert!(session.is_complete());
        assert_eq!(session.current_index(), 1);
        assert!(session.current_question().is_none());
        assert_eq!(session.completed_at(), Some(done_at));

        assert!(session.answer(AnswerSlot::A, done_at).is_none());
        assert_eq!(session.answers().len(), 2);
    }

    #[test]
    fn result_reflects_tally_and_labels() {
        let mut session = QuizSession::new(
            science(),
            vec![question(1, AnswerSlot::A), question(2, AnswerSlot::B)],
            fixed_now(),
        )
        .unwrap();
        assert!(matches!(
            session.build_result(),
            Err(SessionError::NotCompleted)
        ));

        session.answer(AnswerSlot::A, fixed_now());
        session.answer(AnswerSlot::D, fixed_now() + Duration::seconds(75));

        let result = session.build_result().unwrap();
        assert_eq!(result.total_questions(), 2);
        assert_eq!(result.correct_answers(), 1);
        assert_eq!(result.score(), 50.0);
        assert_eq!(result.category(), "Science");
        assert_eq!(result.difficulty(), "All");
        assert_eq!(result.elapsed(), Duration::seconds(75));
    }

    #[test]
    fn clock_moving_backwards_gives_zero_elapsed() {
        let mut session =
            QuizSession::new(science(), vec![question(1, AnswerSlot::C)], fixed_now()).unwrap();
        session.answer(AnswerSlot::C, fixed_now() - Duration::seconds(5));

        let result = session.build_result().unwrap();
        assert_eq!(result.elapsed(), Duration::zero());
        assert_eq!(result.score(), 100.0);
    }

    #[test]
    fn progress_tracks_answers() {
        let mut session = QuizSession::new(
            science(),
            vec![
                question(1, AnswerSlot::A),
                question(2, AnswerSlot::A),
                question(3, AnswerSlot::A),
            ],
            fixed_now(),
        )
        .unwrap();
        session.answer(AnswerSlot::A, fixed_now());

        let progress = session.progress();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 2);
        assert_eq!(progress.correct, 1);
        assert!(!progress.is_complete);
    }
}
