//! Per-record-kind revision counters used to drive snapshot subscriptions.

use std::sync::Arc;

use tokio::sync::watch;

/// Record kinds that publish change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Questions,
    Results,
}

/// Broadcasts a monotonically increasing revision for each record kind.
///
/// Repositories bump the revision after every successful write. Readers never
/// see the written data through the feed, only the fact that it changed.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    questions: Arc<watch::Sender<u64>>,
    results: Arc<watch::Sender<u64>>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Arc::new(watch::Sender::new(0)),
            results: Arc::new(watch::Sender::new(0)),
        }
    }

    fn sender(&self, kind: RecordKind) -> &watch::Sender<u64> {
        match kind {
            RecordKind::Questions => &self.questions,
            RecordKind::Results => &self.results,
        }
    }

    /// Record that `kind` changed. Works with or without live subscribers.
    pub fn notify(&self, kind: RecordKind) {
        self.sender(kind)
            .send_modify(|revision| *revision = revision.wrapping_add(1));
        tracing::trace!(?kind, revision = self.revision(kind), "record change published");
    }

    #[must_use]
    pub fn revision(&self, kind: RecordKind) -> u64 {
        *self.sender(kind).borrow()
    }

    #[must_use]
    pub fn subscribe(&self, kind: RecordKind) -> ChangeSubscription {
        ChangeSubscription {
            kind,
            rx: self.sender(kind).subscribe(),
        }
    }
}

/// Receiving side of a `ChangeFeed` for a single record kind.
#[derive(Debug)]
pub struct ChangeSubscription {
    kind: RecordKind,
    rx: watch::Receiver<u64>,
}

impl ChangeSubscription {
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Mark the current revision as seen and return it.
    pub fn mark_seen(&mut self) -> u64 {
        *self.rx.borrow_and_update()
    }

    /// Wait until the revision moves past the last seen one.
    ///
    /// Returns `false` once the feed has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Whether a change is pending without waiting.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_observe_coalesced_changes() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe(RecordKind::Results);
        assert_eq!(sub.mark_seen(), 0);
        assert!(!sub.has_changed());

        feed.notify(RecordKind::Results);
        feed.notify(RecordKind::Results);
        assert!(sub.has_changed());
        assert!(sub.changed().await);
        assert_eq!(sub.mark_seen(), 2);
        assert!(!sub.has_changed());
    }

    #[test]
    fn kinds_are_independent() {
        let feed = ChangeFeed::new();
        let sub = feed.subscribe(RecordKind::Questions);
        feed.notify(RecordKind::Results);
        assert!(!sub.has_changed());
        assert_eq!(feed.revision(RecordKind::Questions), 0);
        assert_eq!(feed.revision(RecordKind::Results), 1);
    }

    #[tokio::test]
    async fn dropped_feed_closes_subscription() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe(RecordKind::Questions);
        drop(feed);
        assert!(!sub.changed().await);
    }
}
