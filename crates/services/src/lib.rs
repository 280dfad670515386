#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod feeds;
pub mod question_bank;
pub mod sample_bank;
pub mod sessions;
pub mod stats_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, QuestionBankError, SessionError, StatsError};
pub use feeds::{FeedService, SnapshotSource, Snapshots};
pub use question_bank::QuestionBankService;
pub use sessions::{
    AnsweredQuestion, MAX_QUESTIONS_PER_SESSION, QuizSession, SessionController, SessionPhase,
    SessionProgress, SubmitOutcome,
};
pub use stats_service::{DEFAULT_TOP_SCORES, QuizStatistics, StatsService};
