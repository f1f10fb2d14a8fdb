//! Tracking record storage backends.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use vassago_core::{Result, TrackingId, TrackingRecord};

/// Trait for tracking record storage backends.
#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Creates an unopened record for `recipient` and returns its identifier.
    async fn create(&self, recipient: &str) -> Result<TrackingId>;

    /// Registers one open event.
    ///
    /// Returns `false` without side effects if `id` is unknown.
    async fn record_open(&self, id: &TrackingId) -> Result<bool>;

    /// Returns the first record created for `recipient`, if any.
    async fn find_by_recipient(&self, recipient: &str) -> Result<Option<TrackingRecord>>;

    /// Gets a record by identifier.
    async fn get(&self, id: &TrackingId) -> Result<Option<TrackingRecord>>;

    /// Returns the total number of records.
    async fn count(&self) -> Result<usize>;
}

#[derive(Default)]
struct Inner {
    records: HashMap<TrackingId, TrackingRecord>,
    // Ids per recipient, oldest first.
    by_recipient: HashMap<String, Vec<TrackingId>>,
}

/// In-memory tracking store. Records live for the lifetime of the process.
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// Creates a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackingStore for InMemoryStore {
    async fn create(&self, recipient: &str) -> Result<TrackingId> {
        let record = TrackingRecord::new(recipient);
        let id = record.id.clone();

        let mut inner = self.inner.write();
        inner
            .by_recipient
            .entry(recipient.to_string())
            .or_default()
            .push(id.clone());
        inner.records.insert(id.clone(), record);

        tracing::debug!(tracking_id = %id, "Tracking record created");
        Ok(id)
    }

    async fn record_open(&self, id: &TrackingId) -> Result<bool> {
        let mut inner = self.inner.write();
        let Some(record) = inner.records.get_mut(id) else {
            return Ok(false);
        };
        record.mark_opened(Utc::now());

        tracing::debug!(tracking_id = %id, opens = record.open_count, "Open recorded");
        Ok(true)
    }

    async fn find_by_recipient(&self, recipient: &str) -> Result<Option<TrackingRecord>> {
        let inner = self.inner.read();
        Ok(inner
            .by_recipient
            .get(recipient)
            .and_then(|ids| ids.first())
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    async fn get(&self, id: &TrackingId) -> Result<Option<TrackingRecord>> {
        Ok(self.inner.read().records.get(id).cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().records.len())
    }
}
