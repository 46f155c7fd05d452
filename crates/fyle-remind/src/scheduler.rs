//! Reminder scheduler: keeps a sink in step with document reminder dates.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info};

use crate::planner::ReminderPlanner;
use crate::sink::NotificationSink;
use crate::types::*;
use fyle_core::{Error, Result};
use fyle_store::{Document, SqliteStore};

/// Plans notifications for documents and hands them to a sink.
pub struct ReminderScheduler<Tz: TimeZone> {
    planner: ReminderPlanner<Tz>,
    sink: Arc<dyn NotificationSink>,
}

impl<Tz: TimeZone> ReminderScheduler<Tz> {
    pub fn new(planner: ReminderPlanner<Tz>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { planner, sink }
    }

    pub fn planner(&self) -> &ReminderPlanner<Tz> {
        &self.planner
    }

    pub fn sink(&self) -> &Arc<dyn NotificationSink> {
        &self.sink
    }

    /// Replace the pending ladder for a document. Returns what was planned.
    pub fn schedule_document(
        &self,
        doc: &Document,
        now: DateTime<Utc>,
    ) -> Result<Vec<PlannedNotification>> {
        self.cancel_document(doc.id)?;
        let Some(reminder) = doc.reminder_date else {
            return Ok(Vec::new());
        };
        let planned = self.planner.plan(doc.id, &doc.name, reminder, now);
        for notification in &planned {
            self.sink.schedule(notification.clone())?;
        }
        debug!("Planned {} notifications for document {}", planned.len(), doc.id);
        Ok(planned)
    }

    /// Drop every pending notification for a document, fallback included.
    pub fn cancel_document(&self, doc_id: i64) -> Result<()> {
        let ids: Vec<String> = NotificationKind::LADDER
            .iter()
            .chain(std::iter::once(&NotificationKind::Fallback))
            .map(|kind| kind.id_for(doc_id))
            .collect();
        self.sink.cancel(&ids)
    }

    /// Push a document's reminder by the snooze duration and re-plan it.
    ///
    /// Returns `Ok(None)` if the document does not exist.
    pub fn snooze(
        &self,
        store: &SqliteStore,
        doc_id: i64,
        duration: SnoozeDuration,
        now: DateTime<Utc>,
    ) -> Result<Option<Document>> {
        let Some(doc) = store.get_document(doc_id)? else {
            return Ok(None);
        };
        let reminder = doc
            .reminder_date
            .ok_or_else(|| Error::NotFound(format!("reminder for document {}", doc_id)))?;

        let snoozed = reminder + duration.as_duration();
        store.set_reminder(doc_id, Some(snoozed))?;
        let Some(updated) = store.get_document(doc_id)? else {
            return Ok(None);
        };
        self.schedule_document(&updated, now)?;
        info!("Snoozed document {} to {}", doc_id, snoozed);
        Ok(Some(updated))
    }

    /// Re-plan every document with a future reminder. Returns the number of
    /// notifications scheduled.
    pub fn resync(&self, store: &SqliteStore, now: DateTime<Utc>) -> Result<usize> {
        let mut scheduled = 0;
        for doc in store.documents_with_reminders()? {
            if doc.reminder_date.is_some_and(|r| r >= now) {
                scheduled += self.schedule_document(&doc, now)?.len();
            }
        }
        info!("Reminder resync: {} notifications pending", scheduled);
        Ok(scheduled)
    }

    /// Schedule a catch-up notification for every missed reminder that does
    /// not already have one. Returns the newly scheduled notifications.
    pub fn schedule_missed(
        &self,
        store: &SqliteStore,
        now: DateTime<Utc>,
    ) -> Result<Vec<PlannedNotification>> {
        let entries = self.entries(store)?;
        let mut scheduled = Vec::new();
        for entry in self.planner.missed(&entries, now) {
            let fallback_id = NotificationKind::Fallback.id_for(entry.doc_id);
            let already = self
                .sink
                .pending_for(entry.doc_id)
                .iter()
                .any(|n| n.id == fallback_id);
            if already {
                continue;
            }
            let fallback = self.planner.fallback(entry.doc_id, &entry.name, now);
            self.sink.schedule(fallback.clone())?;
            scheduled.push(fallback);
        }
        if !scheduled.is_empty() {
            info!("Scheduled {} missed-reminder notifications", scheduled.len());
        }
        Ok(scheduled)
    }

    pub fn groups(&self, store: &SqliteStore, now: DateTime<Utc>) -> Result<ReminderGroups> {
        Ok(self.planner.group(&self.entries(store)?, now))
    }

    pub fn upcoming(&self, store: &SqliteStore, now: DateTime<Utc>) -> Result<UpcomingDigest> {
        Ok(self.planner.upcoming(&self.entries(store)?, now))
    }

    pub fn missed(&self, store: &SqliteStore, now: DateTime<Utc>) -> Result<Vec<ReminderEntry>> {
        Ok(self.planner.missed(&self.entries(store)?, now))
    }

    fn entries(&self, store: &SqliteStore) -> Result<Vec<ReminderEntry>> {
        Ok(store
            .documents_with_reminders()?
            .iter()
            .filter_map(ReminderEntry::from_document)
            .collect())
    }
}
