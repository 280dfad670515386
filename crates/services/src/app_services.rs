use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::feeds::FeedService;
use crate::question_bank::QuestionBankService;
use crate::sessions::SessionController;
use crate::stats_service::StatsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    question_bank: Arc<QuestionBankService>,
    stats: Arc<StatsService>,
    feeds: Arc<FeedService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, seeding sample questions
    /// into an empty database.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or seeding fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let services = Self::open_sqlite(db_url, clock).await?;
        services.question_bank.seed_if_empty().await?;
        Ok(services)
    }

    /// Build services backed by `SQLite` storage without touching its contents.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn open_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock))
    }

    /// Build services over a fresh in-memory store, seeded with sample questions.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if seeding fails.
    pub async fn in_memory(clock: Clock) -> Result<Self, AppServicesError> {
        let services = Self::from_storage(Storage::in_memory(), clock);
        services.question_bank.seed_if_empty().await?;
        Ok(services)
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock) -> Self {
        let question_bank = Arc::new(QuestionBankService::new(
            clock,
            Arc::clone(&storage.questions),
        ));
        let stats = Arc::new(StatsService::new(
            clock,
            Arc::clone(&storage.questions),
            Arc::clone(&storage.results),
        ));
        let feeds = Arc::new(FeedService::new(
            Arc::clone(&storage.questions),
            Arc::clone(&storage.results),
            storage.changes.clone(),
        ));

        Self {
            clock,
            storage,
            question_bank,
            stats,
            feeds,
        }
    }

    /// A new controller sharing this store. Each caller owns its own quiz state.
    #[must_use]
    pub fn session_controller(&self) -> SessionController {
        SessionController::new(
            self.clock,
            Arc::clone(&self.storage.questions),
            Arc::clone(&self.storage.results),
        )
    }

    #[must_use]
    pub fn question_bank(&self) -> Arc<QuestionBankService> {
        Arc::clone(&self.question_bank)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats)
    }

    #[must_use]
    pub fn feeds(&self) -> Arc<FeedService> {
        Arc::clone(&self.feeds)
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}
