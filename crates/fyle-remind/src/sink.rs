//! Notification sinks.
//!
//! Delivery is best effort: a sink accepts planned notifications and is
//! responsible for surfacing them when they fall due.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::types::PlannedNotification;
use fyle_core::Result;

/// Destination for planned notifications.
pub trait NotificationSink: Send + Sync {
    /// Schedule a notification, replacing any pending one with the same ID.
    fn schedule(&self, notification: PlannedNotification) -> Result<()>;

    /// Remove pending notifications by ID. Unknown IDs are ignored.
    fn cancel(&self, ids: &[String]) -> Result<()>;

    /// Pending notifications for one document, in firing order.
    fn pending_for(&self, doc_id: i64) -> Vec<PlannedNotification>;
}

/// In-process sink that holds pending notifications until they are due.
#[derive(Default)]
pub struct MemorySink {
    pending: Mutex<BTreeMap<String, PlannedNotification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every notification due at or before `now`,
    /// in firing order.
    pub fn take_due(&self, now: DateTime<Utc>) -> Vec<PlannedNotification> {
        let mut pending = self.pending.lock();
        let due_ids: Vec<String> = pending
            .values()
            .filter(|n| n.fire_at <= now)
            .map(|n| n.id.clone())
            .collect();
        let mut due: Vec<PlannedNotification> =
            due_ids.iter().filter_map(|id| pending.remove(id)).collect();
        due.sort_by_key(|n| n.fire_at);
        due
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pending.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl NotificationSink for MemorySink {
    fn schedule(&self, notification: PlannedNotification) -> Result<()> {
        debug!("Scheduled {} at {}", notification.id, notification.fire_at);
        self.pending.lock().insert(notification.id.clone(), notification);
        Ok(())
    }

    fn cancel(&self, ids: &[String]) -> Result<()> {
        let mut pending = self.pending.lock();
        for id in ids {
            pending.remove(id);
        }
        Ok(())
    }

    fn pending_for(&self, doc_id: i64) -> Vec<PlannedNotification> {
        let mut found: Vec<PlannedNotification> = self
            .pending
            .lock()
            .values()
            .filter(|n| n.doc_id == doc_id)
            .cloned()
            .collect();
        found.sort_by_key(|n| n.fire_at);
        found
    }
}
