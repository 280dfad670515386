//! Line-based interactive quiz loop.

use std::io::Write;

use anyhow::Result;
use quiz_core::model::{AnswerSlot, StoredResult};
use services::{AnsweredQuestion, SessionController, SessionError, SubmitOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::cli::FilterArgs;
use crate::format::{format_elapsed, format_score, progress_line, question_block};

/// How an interactive quiz ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    Finished(StoredResult),
    Abandoned,
    NoQuestions,
}

/// Run one quiz, reading answers from `input` and writing prompts to `out`.
///
/// `q` or end of input abandons the quiz without recording a result.
///
/// # Errors
///
/// Returns an error if reading input, writing output or storage fails.
pub async fn play<R, W>(
    controller: &mut SessionController,
    filter: &FilterArgs,
    input: &mut Lines<R>,
    out: &mut W,
) -> Result<PlayOutcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match controller
        .start_with_labels(&filter.category, &filter.difficulty)
        .await
    {
        Ok(_) => {}
        Err(SessionError::Empty) => {
            writeln!(
                out,
                "No questions available for {} / {}.",
                filter.category, filter.difficulty
            )?;
            return Ok(PlayOutcome::NoQuestions);
        }
        Err(err) => return Err(err.into()),
    }

    loop {
        let (Some(question), Some(progress)) = (
            controller.current_question().cloned(),
            controller.progress(),
        ) else {
            // No current question means the quiz has already completed.
            return finalize(controller, out).await;
        };

        writeln!(out)?;
        writeln!(out, "{}", progress_line(&progress))?;
        write!(out, "{}", question_block(&question))?;

        let choice = loop {
            write!(out, "Your answer (A-D, q to quit): ")?;
            out.flush()?;
            let Some(line) = input.next_line().await? else {
                return abandon(controller, out);
            };
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                return abandon(controller, out);
            }
            match line.parse::<AnswerSlot>() {
                Ok(slot) => break slot,
                Err(_) => writeln!(out, "Please answer A, B, C or D.")?,
            }
        };

        match controller.submit_answer(choice).await {
            Ok(SubmitOutcome::Advanced { answer, .. }) => {
                feedback(out, &answer, question.option(answer.correct_slot))?;
            }
            Ok(SubmitOutcome::Completed { answer, result }) => {
                feedback(out, &answer, question.option(answer.correct_slot))?;
                summary(out, &result)?;
                return Ok(PlayOutcome::Finished(result));
            }
            Ok(SubmitOutcome::Ignored) => return not_running(out),
            Err(SessionError::Storage(err)) => {
                tracing::warn!(error = %err, "saving result failed, retrying once");
                writeln!(out, "Could not save your result ({err}), retrying...")?;
                return finalize(controller, out).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

async fn finalize<W: Write>(controller: &mut SessionController, out: &mut W) -> Result<PlayOutcome> {
    let result = controller.finalize_result().await?;
    summary(out, &result)?;
    Ok(PlayOutcome::Finished(result))
}

fn abandon<W: Write>(controller: &mut SessionController, out: &mut W) -> Result<PlayOutcome> {
    controller.reset();
    writeln!(out)?;
    writeln!(out, "Quiz abandoned, nothing was recorded.")?;
    Ok(PlayOutcome::Abandoned)
}

fn not_running<W: Write>(out: &mut W) -> Result<PlayOutcome> {
    tracing::debug!("answer ignored, controller has no active quiz");
    writeln!(out)?;
    writeln!(out, "The quiz is no longer running, nothing was recorded.")?;
    Ok(PlayOutcome::Abandoned)
}

fn feedback<W: Write>(out: &mut W, answer: &AnsweredQuestion, correct_text: &str) -> std::io::Result<()> {
    if answer.is_correct {
        writeln!(out, "Correct!")
    } else {
        writeln!(
            out,
            "Wrong. The answer was {}) {correct_text}",
            answer.correct_slot
        )
    }
}

fn summary<W: Write>(out: &mut W, stored: &StoredResult) -> std::io::Result<()> {
    let result = &stored.result;
    writeln!(out)?;
    writeln!(out, "{}", result.performance())?;
    writeln!(
        out,
        "You scored {}/{} ({}) in {}.",
        result.correct_answers(),
        result.total_questions(),
        format_score(result.score()),
        format_elapsed(result.elapsed())
    )?;
    writeln!(out, "Saved as result #{}.", stored.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_clock;
    use services::{AppServices, Clock, SessionPhase};
    use storage::repository::Storage;
    use tokio::io::BufReader;

    fn lines(text: &'static str) -> Lines<BufReader<&'static [u8]>> {
        BufReader::new(text.as_bytes()).lines()
    }

    fn science_only() -> FilterArgs {
        FilterArgs {
            category: "Science".into(),
            difficulty: "Easy".into(),
        }
    }

    async fn services() -> AppServices {
        AppServices::in_memory(fixed_clock()).await.unwrap()
    }

    #[tokio::test]
    async fn finishes_quiz_and_records_result() {
        let services = services().await;
        let mut ctl = services.session_controller().with_seed(1);
        let mut out = Vec::new();
        // Two easy Science questions in the sample bank; the first line is rejected.
        let mut input = lines("x\nA\nb\n");

        let outcome = play(&mut ctl, &science_only(), &mut input, &mut out)
            .await
            .unwrap();
        let PlayOutcome::Finished(result) = outcome else {
            panic!("expected finished quiz, got {outcome:?}");
        };
        assert_eq!(result.result.total_questions(), 2);
        assert_eq!(result.result.category(), "Science");
        assert_eq!(result.result.difficulty(), "Easy");

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Question 1/2 (50%)"));
        assert!(text.contains("Question 2/2 (100%)"));
        assert!(text.contains("Please answer A, B, C or D."));
        assert!(text.contains("You scored"));
        assert_eq!(services.stats().statistics().await.unwrap().total_quizzes, 1);
    }

    #[tokio::test]
    async fn quitting_records_nothing() {
        let services = services().await;
        let mut ctl = services.session_controller();
        let mut out = Vec::new();
        let mut input = lines("q\n");

        let outcome = play(&mut ctl, &FilterArgs::default(), &mut input, &mut out)
            .await
            .unwrap();
        assert_eq!(outcome, PlayOutcome::Abandoned);
        assert_eq!(ctl.phase(), SessionPhase::Idle);
        assert_eq!(services.stats().statistics().await.unwrap().total_quizzes, 0);
    }

    #[tokio::test]
    async fn end_of_input_abandons() {
        let services = services().await;
        let mut ctl = services.session_controller();
        let mut out = Vec::new();
        let mut input = lines("");

        let outcome = play(&mut ctl, &FilterArgs::default(), &mut input, &mut out)
            .await
            .unwrap();
        assert_eq!(outcome, PlayOutcome::Abandoned);
    }

    #[test]
    fn ignored_answer_tells_the_player() {
        let mut out = Vec::new();
        assert_eq!(not_running(&mut out).unwrap(), PlayOutcome::Abandoned);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("no longer running"));
    }

    #[tokio::test]
    async fn empty_bank_reports_no_questions() {
        let services = AppServices::from_storage(Storage::in_memory(), Clock::default_clock());
        let mut ctl = services.session_controller();
        let mut out = Vec::new();
        let mut input = lines("A\n");

        let outcome = play(&mut ctl, &FilterArgs::default(), &mut input, &mut out)
            .await
            .unwrap();
        assert_eq!(outcome, PlayOutcome::NoQuestions);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No questions available for All / All."));
    }
}
