//! Pull-based snapshot sequences over the record store.
//!
//! A `Snapshots` handle yields the current state on its first `next()` and
//! afterwards waits for the underlying record kind to change before reading
//! again. Writes that land while the consumer is busy collapse into a single
//! re-read.

use std::sync::Arc;

use async_trait::async_trait;

use quiz_core::model::{Question, QuestionFilter, StoredResult};
use storage::feed::{ChangeFeed, ChangeSubscription, RecordKind};
use storage::repository::{QuestionRepository, ResultRepository, StorageError};

/// A query whose answer can be re-read whenever its record kind changes.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    type Item: Send;

    fn kind(&self) -> RecordKind;

    async fn load(&self) -> Result<Self::Item, StorageError>;
}

/// Questions matching a filter, ordered by id.
pub struct QuestionSnapshot {
    questions: Arc<dyn QuestionRepository>,
    filter: QuestionFilter,
}

#[async_trait]
impl SnapshotSource for QuestionSnapshot {
    type Item = Vec<Question>;

    fn kind(&self) -> RecordKind {
        RecordKind::Questions
    }

    async fn load(&self) -> Result<Self::Item, StorageError> {
        self.questions.list_questions(&self.filter).await
    }
}

/// Leaderboard of the best `limit` results.
pub struct TopScoresSnapshot {
    results: Arc<dyn ResultRepository>,
    limit: u32,
}

#[async_trait]
impl SnapshotSource for TopScoresSnapshot {
    type Item = Vec<StoredResult>;

    fn kind(&self) -> RecordKind {
        RecordKind::Results
    }

    async fn load(&self) -> Result<Self::Item, StorageError> {
        self.results.top_scores(self.limit).await
    }
}

/// Result history, newest first, optionally for one category label.
pub struct HistorySnapshot {
    results: Arc<dyn ResultRepository>,
    category: Option<String>,
}

#[async_trait]
impl SnapshotSource for HistorySnapshot {
    type Item = Vec<StoredResult>;

    fn kind(&self) -> RecordKind {
        RecordKind::Results
    }

    async fn load(&self) -> Result<Self::Item, StorageError> {
        self.results
            .list_results(self.category.as_deref(), u32::MAX)
            .await
    }
}

/// Lazy sequence of snapshots produced by a `SnapshotSource`.
pub struct Snapshots<S> {
    source: S,
    subscription: ChangeSubscription,
    reload_pending: bool,
}

impl<S: SnapshotSource> Snapshots<S> {
    #[must_use]
    pub fn new(source: S, changes: &ChangeFeed) -> Self {
        let subscription = changes.subscribe(source.kind());
        Self {
            source,
            subscription,
            reload_pending: true,
        }
    }

    /// Next snapshot, or `None` once the change feed has closed.
    ///
    /// The first call returns immediately. A failed read is retried by the
    /// following call without waiting for another change.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if reading the snapshot fails.
    pub async fn next(&mut self) -> Result<Option<S::Item>, StorageError> {
        if !self.reload_pending {
            if !self.subscription.changed().await {
                return Ok(None);
            }
            self.reload_pending = true;
        }

        // A write landing during the load wakes the following call.
        let revision = self.subscription.mark_seen();
        let item = self.source.load().await?;
        self.reload_pending = false;
        tracing::trace!(kind = ?self.source.kind(), revision, "snapshot delivered");
        Ok(Some(item))
    }

    /// Whether `next()` would return without waiting.
    #[must_use]
    pub fn has_update(&self) -> bool {
        self.reload_pending || self.subscription.has_changed()
    }
}

/// Factory for snapshot sequences over one store.
#[derive(Clone)]
pub struct FeedService {
    questions: Arc<dyn QuestionRepository>,
    results: Arc<dyn ResultRepository>,
    changes: ChangeFeed,
}

impl FeedService {
    #[must_use]
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        results: Arc<dyn ResultRepository>,
        changes: ChangeFeed,
    ) -> Self {
        Self {
            questions,
            results,
            changes,
        }
    }

    #[must_use]
    pub fn questions(&self) -> Snapshots<QuestionSnapshot> {
        self.questions_matching(QuestionFilter::all())
    }

    #[must_use]
    pub fn questions_matching(&self, filter: QuestionFilter) -> Snapshots<QuestionSnapshot> {
        let source = QuestionSnapshot {
            questions: Arc::clone(&self.questions),
            filter,
        };
        Snapshots::new(source, &self.changes)
    }

    #[must_use]
    pub fn top_scores(&self, limit: u32) -> Snapshots<TopScoresSnapshot> {
        let source = TopScoresSnapshot {
            results: Arc::clone(&self.results),
            limit,
        };
        Snapshots::new(source, &self.changes)
    }

    #[must_use]
    pub fn results(&self) -> Snapshots<HistorySnapshot> {
        self.results_in(None)
    }

    #[must_use]
    pub fn results_in(&self, category: Option<String>) -> Snapshots<HistorySnapshot> {
        let source = HistorySnapshot {
            results: Arc::clone(&self.results),
            category,
        };
        Snapshots::new(source, &self.changes)
    }
}
