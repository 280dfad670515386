#![forbid(unsafe_code)]

pub mod feed;
pub mod repository;
pub mod sqlite;

pub use feed::{ChangeFeed, ChangeSubscription, RecordKind};
pub use repository::{
    InMemoryRepository, QuestionRepository, ResultRepository, Storage, StorageError,
};
