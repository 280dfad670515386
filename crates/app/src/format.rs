//! Plain-text rendering for terminal output.

use chrono::Duration;
use quiz_core::model::{AnswerSlot, Question, StoredResult};
use services::{QuizStatistics, SessionProgress};

/// `"2m 5s"`, or just `"45s"` under a minute.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let minutes = total / 60;
    let seconds = total % 60;
    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

pub fn format_score(score: f64) -> String {
    format!("{score:.1}%")
}

/// Header line above a question, e.g. `"Question 3/10 (30%)"`.
pub fn progress_line(progress: &SessionProgress) -> String {
    let percent = (progress.fraction() * 100.0).round();
    format!(
        "Question {}/{} ({percent}%)",
        progress.position(),
        progress.total
    )
}

pub fn question_block(question: &Question) -> String {
    let options: String = AnswerSlot::ALL
        .iter()
        .zip(question.options())
        .map(|(slot, option)| format!("  {slot}) {option}\n"))
        .collect();
    format!(
        "[{} / {}] {}\n{options}",
        question.category(),
        question.difficulty(),
        question.prompt()
    )
}

pub fn result_row(stored: &StoredResult) -> String {
    let result = &stored.result;
    format!(
        "#{:<4} {}  {:<12} {:<7} {:>2}/{:<2} {:>6}  {:<12} {}",
        stored.id.value(),
        result.completed_at().format("%Y-%m-%d %H:%M"),
        result.category(),
        result.difficulty(),
        result.correct_answers(),
        result.total_questions(),
        format_score(result.score()),
        result.performance().headline(),
        format_elapsed(result.elapsed()),
    )
}

pub fn statistics_block(stats: &QuizStatistics) -> String {
    format!(
        "Total questions: {}\nQuizzes taken:   {}\nAverage score:   {}",
        stats.total_questions,
        stats.total_quizzes,
        format_score(stats.average_score)
    )
}
