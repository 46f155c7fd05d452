//! Reminder types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use fyle_store::Document;

/// Which notification in a document's reminder ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Seven days before, at the reminder hour.
    SevenDays,
    /// The day before, at the reminder hour.
    DayBefore,
    /// On the day, at the reminder hour.
    Today,
    /// Twelve hours before the reminder instant.
    TwelveHours,
    /// Catch-up for a reminder that passed unseen.
    Fallback,
}

impl NotificationKind {
    /// The regular ladder, in firing order.
    pub const LADDER: [NotificationKind; 4] = [
        NotificationKind::SevenDays,
        NotificationKind::DayBefore,
        NotificationKind::Today,
        NotificationKind::TwelveHours,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Self::SevenDays => "_7days",
            Self::DayBefore => "_dayBefore",
            Self::Today => "_today",
            Self::TwelveHours => "_12hours",
            Self::Fallback => "_fallback",
        }
    }

    /// Notification identifier for a document.
    pub fn id_for(self, doc_id: i64) -> String {
        format!("{}{}", doc_id, self.suffix())
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::SevenDays => "Document Expiring This Week",
            Self::DayBefore => "Document Expiring Tomorrow",
            Self::Today => "Document Expiring Today",
            Self::TwelveHours => "Urgent: Document Expiring in 12 Hours",
            Self::Fallback => "Document Expiry Reminder (Missed)",
        }
    }

    pub fn body(self, name: &str) -> String {
        match self {
            Self::SevenDays => format!("{} expires in 7 days.", name),
            Self::DayBefore => format!("{} expires tomorrow.", name),
            Self::Today => format!("{} expires today!", name),
            Self::TwelveHours => format!("{} expires in 12 hours!", name),
            Self::Fallback => format!("{} is expiring soon. Original reminder was missed.", name),
        }
    }

    /// Today and 12-hour notifications are delivered as critical alerts.
    pub fn is_critical(self) -> bool {
        matches!(self, Self::Today | Self::TwelveHours)
    }
}

/// A notification ready to be handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedNotification {
    pub id: String,
    pub doc_id: i64,
    pub kind: NotificationKind,
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub critical: bool,
}

impl PlannedNotification {
    pub fn new(doc_id: i64, name: &str, kind: NotificationKind, fire_at: DateTime<Utc>) -> Self {
        Self {
            id: kind.id_for(doc_id),
            doc_id,
            kind,
            fire_at,
            title: kind.title().to_string(),
            body: kind.body(name),
            critical: kind.is_critical(),
        }
    }
}

/// The parts of a document the reminder views need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub doc_id: i64,
    pub name: String,
    pub reminder_date: DateTime<Utc>,
}

impl ReminderEntry {
    /// `None` when the document has no reminder date.
    pub fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            doc_id: doc.id,
            name: doc.name.clone(),
            reminder_date: doc.reminder_date?,
        })
    }
}

/// Reminders split by calendar position relative to today.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderGroups {
    /// Reminder day is before today.
    pub past_due: Vec<ReminderEntry>,
    /// Today or later, within the current month.
    pub this_month: Vec<ReminderEntry>,
    pub later: Vec<ReminderEntry>,
}

/// One entry of the upcoming digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingReminder {
    #[serde(flatten)]
    pub entry: ReminderEntry,
    /// Whole days between now and the reminder.
    pub days_remaining: i64,
}

/// Reminders due within the next seven days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingDigest {
    pub today: Vec<UpcomingReminder>,
    pub tomorrow: Vec<UpcomingReminder>,
    pub soon: Vec<UpcomingReminder>,
}

impl UpcomingDigest {
    pub fn len(&self) -> usize {
        self.today.len() + self.tomorrow.len() + self.soon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How far a snooze pushes a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnoozeDuration {
    Hour,
    Day,
}

impl SnoozeDuration {
    pub fn as_duration(self) -> Duration {
        match self {
            Self::Hour => Duration::hours(1),
            Self::Day => Duration::days(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_ids() {
        assert_eq!(NotificationKind::SevenDays.id_for(4), "4_7days");
        assert_eq!(NotificationKind::DayBefore.id_for(4), "4_dayBefore");
        assert_eq!(NotificationKind::Fallback.id_for(12), "12_fallback");
    }

    #[test]
    fn test_snooze_duration_serde() {
        let d: SnoozeDuration = serde_json::from_str("\"hour\"").unwrap();
        assert_eq!(d, SnoozeDuration::Hour);
        assert_eq!(SnoozeDuration::Day.as_duration(), Duration::hours(24));
        assert!(serde_json::from_str::<SnoozeDuration>("\"week\"").is_err());
    }
}
