mod filter;
mod ids;
mod question;
mod result;

pub use filter::{FilterError, QuestionFilter};
pub use ids::{ParseIdError, QuestionId, ResultId};
pub use question::{
    ALL_LABEL, AnswerSlot, Category, Difficulty, OPTION_COUNT, ParseDifficultyError,
    ParseSlotError, Question, QuestionDraft, QuestionError,
};
pub use result::{Performance, QuizResult, QuizResultError, StoredResult};
