mod controller;
mod progress;
mod quiz;
mod selection;

// Public API of the quiz session subsystem.
pub use crate::error::SessionError;
pub use controller::{MAX_QUESTIONS_PER_SESSION, SessionController, SessionPhase, SubmitOutcome};
pub use progress::SessionProgress;
pub use quiz::{AnsweredQuestion, QuizSession};
