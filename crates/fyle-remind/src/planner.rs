//! Calendar arithmetic for reminders.
//!
//! Day-granular notifications fire at a fixed local hour, so the planner is
//! generic over the time zone that defines "local".

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, TimeZone, Utc};

use crate::types::*;

/// Delay before a catch-up notification for a missed reminder.
pub const FALLBACK_DELAY_MINUTES: i64 = 5;

/// Window covered by the upcoming digest.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Plans notifications and groups reminders in a given time zone.
#[derive(Debug, Clone)]
pub struct ReminderPlanner<Tz: TimeZone> {
    tz: Tz,
    reminder_hour: u32,
}

impl<Tz: TimeZone> ReminderPlanner<Tz> {
    /// `reminder_hour` is clamped to 0-23.
    pub fn new(tz: Tz, reminder_hour: u32) -> Self {
        Self {
            tz,
            reminder_hour: reminder_hour.min(23),
        }
    }

    pub fn reminder_hour(&self) -> u32 {
        self.reminder_hour
    }

    /// Notifications for a reminder, keeping only those strictly after `now`.
    pub fn plan(
        &self,
        doc_id: i64,
        name: &str,
        reminder: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Vec<PlannedNotification> {
        let day = self.local_date(reminder);
        NotificationKind::LADDER
            .iter()
            .filter_map(|kind| {
                let fire_at = match kind {
                    NotificationKind::SevenDays => {
                        self.at_reminder_hour(day.checked_sub_days(Days::new(7))?)
                    }
                    NotificationKind::DayBefore => self.at_reminder_hour(day.pred_opt()?),
                    NotificationKind::Today => self.at_reminder_hour(day),
                    NotificationKind::TwelveHours => reminder.checked_sub_signed(Duration::hours(12)),
                    NotificationKind::Fallback => None,
                }?;
                (fire_at > now).then(|| PlannedNotification::new(doc_id, name, *kind, fire_at))
            })
            .collect()
    }

    /// Catch-up notification for a reminder that passed.
    pub fn fallback(&self, doc_id: i64, name: &str, now: DateTime<Utc>) -> PlannedNotification {
        PlannedNotification::new(
            doc_id,
            name,
            NotificationKind::Fallback,
            now + Duration::minutes(FALLBACK_DELAY_MINUTES),
        )
    }

    /// Split reminders into past due, this month, and later. Each group is
    /// sorted by reminder date.
    pub fn group(&self, entries: &[ReminderEntry], now: DateTime<Utc>) -> ReminderGroups {
        let today = self.local_date(now);
        let mut groups = ReminderGroups::default();
        for entry in entries {
            let day = self.local_date(entry.reminder_date);
            if day < today {
                groups.past_due.push(entry.clone());
            } else if day.year() == today.year() && day.month() == today.month() {
                groups.this_month.push(entry.clone());
            } else {
                groups.later.push(entry.clone());
            }
        }
        for group in [&mut groups.past_due, &mut groups.this_month, &mut groups.later] {
            group.sort_by_key(|e| (e.reminder_date, e.doc_id));
        }
        groups
    }

    /// Reminders between now and seven days from now, split by whole days
    /// remaining: 0 is today, 1 is tomorrow, anything else is soon.
    pub fn upcoming(&self, entries: &[ReminderEntry], now: DateTime<Utc>) -> UpcomingDigest {
        let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);
        let mut within: Vec<&ReminderEntry> = entries
            .iter()
            .filter(|e| e.reminder_date >= now && e.reminder_date <= horizon)
            .collect();
        within.sort_by_key(|e| (e.reminder_date, e.doc_id));

        let mut digest = UpcomingDigest::default();
        for entry in within {
            let days_remaining = (entry.reminder_date - now).num_days();
            let item = UpcomingReminder {
                entry: entry.clone(),
                days_remaining,
            };
            match days_remaining {
                0 => digest.today.push(item),
                1 => digest.tomorrow.push(item),
                _ => digest.soon.push(item),
            }
        }
        digest
    }

    /// Reminders whose instant has already passed, oldest first.
    pub fn missed(&self, entries: &[ReminderEntry], now: DateTime<Utc>) -> Vec<ReminderEntry> {
        let mut missed: Vec<ReminderEntry> = entries
            .iter()
            .filter(|e| e.reminder_date < now)
            .cloned()
            .collect();
        missed.sort_by_key(|e| (e.reminder_date, e.doc_id));
        missed
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// `None` when the local time does not exist (DST gap).
    fn at_reminder_hour(&self, day: NaiveDate) -> Option<DateTime<Utc>> {
        let naive = day.and_hms_opt(self.reminder_hour, 0, 0)?;
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn entry(doc_id: i64, at: DateTime<Utc>) -> ReminderEntry {
        ReminderEntry {
            doc_id,
            name: format!("doc {}", doc_id),
            reminder_date: at,
        }
    }

    fn kinds(planned: &[PlannedNotification]) -> Vec<NotificationKind> {
        planned.iter().map(|p| p.kind).collect()
    }

    #[test]
    fn test_full_ladder() {
        let planner = ReminderPlanner::new(Utc, 9);
        let reminder = utc(2026, 3, 20, 12, 0);
        let planned = planner.plan(7, "Passport", reminder, utc(2026, 3, 1, 0, 0));

        assert_eq!(kinds(&planned), NotificationKind::LADDER.to_vec());
        assert_eq!(planned[0].fire_at, utc(2026, 3, 13, 9, 0));
        assert_eq!(planned[1].fire_at, utc(2026, 3, 19, 9, 0));
        assert_eq!(planned[2].fire_at, utc(2026, 3, 20, 9, 0));
        assert_eq!(planned[3].fire_at, utc(2026, 3, 20, 0, 0));
        assert_eq!(planned[0].id, "7_7days");
        assert_eq!(planned[3].body, "Passport expires in 12 hours!");
        assert!(planned[3].critical);
        assert!(!planned[0].critical);
    }

    #[test]
    fn test_only_future_triggers() {
        let planner = ReminderPlanner::new(Utc, 9);
        let reminder = utc(2026, 3, 20, 12, 0);

        let planned = planner.plan(1, "x", reminder, utc(2026, 3, 19, 10, 0));
        assert_eq!(
            kinds(&planned),
            vec![NotificationKind::Today, NotificationKind::TwelveHours]
        );

        let planned = planner.plan(1, "x", reminder, utc(2026, 3, 20, 9, 0));
        assert!(planned.is_empty());
    }

    #[test]
    fn test_local_reminder_hour() {
        // UTC+5:30: the local day of 2026-03-20 20:00 UTC is the 21st.
        let tz = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let planner = ReminderPlanner::new(tz, 9);
        let planned = planner.plan(1, "x", utc(2026, 3, 20, 20, 0), utc(2026, 1, 1, 0, 0));
        let today = planned
            .iter()
            .find(|p| p.kind == NotificationKind::Today)
            .unwrap();
        assert_eq!(today.fire_at, utc(2026, 3, 21, 3, 30));
    }

    #[test]
    fn test_fallback_in_five_minutes() {
        let planner = ReminderPlanner::new(Utc, 9);
        let now = utc(2026, 5, 1, 8, 0);
        let fallback = planner.fallback(3, "Lease", now);
        assert_eq!(fallback.id, "3_fallback");
        assert_eq!(fallback.fire_at, utc(2026, 5, 1, 8, 5));
    }

    #[test]
    fn test_grouping() {
        let planner = ReminderPlanner::new(Utc, 9);
        let now = utc(2026, 5, 15, 10, 0);
        let entries = vec![
            entry(1, utc(2026, 6, 2, 12, 0)),
            entry(2, utc(2026, 5, 14, 23, 0)),
            entry(3, utc(2026, 5, 15, 1, 0)),
            entry(4, utc(2026, 5, 30, 12, 0)),
            entry(5, utc(2025, 5, 20, 12, 0)),
        ];
        let groups = planner.group(&entries, now);
        let ids = |g: &[ReminderEntry]| g.iter().map(|e| e.doc_id).collect::<Vec<_>>();
        assert_eq!(ids(&groups.past_due), vec![5, 2]);
        // Earlier today is not past due.
        assert_eq!(ids(&groups.this_month), vec![3, 4]);
        assert_eq!(ids(&groups.later), vec![1]);
    }

    #[test]
    fn test_upcoming_digest() {
        let planner = ReminderPlanner::new(Utc, 9);
        let now = utc(2026, 5, 15, 10, 0);
        let entries = vec![
            entry(1, utc(2026, 5, 15, 18, 0)),
            entry(2, utc(2026, 5, 16, 12, 0)),
            entry(3, utc(2026, 5, 19, 12, 0)),
            entry(4, utc(2026, 5, 30, 12, 0)),
            entry(5, utc(2026, 5, 14, 12, 0)),
        ];
        let digest = planner.upcoming(&entries, now);
        assert_eq!(digest.len(), 3);
        assert_eq!(digest.today[0].entry.doc_id, 1);
        assert_eq!(digest.tomorrow[0].entry.doc_id, 2);
        assert_eq!(digest.soon[0].entry.doc_id, 3);
        assert_eq!(digest.soon[0].days_remaining, 4);
    }

    #[test]
    fn test_missed() {
        let planner = ReminderPlanner::new(Utc, 9);
        let now = utc(2026, 5, 15, 10, 0);
        let entries = vec![
            entry(1, utc(2026, 5, 15, 11, 0)),
            entry(2, utc(2026, 5, 15, 9, 59)),
            entry(3, utc(2026, 1, 1, 12, 0)),
        ];
        let missed: Vec<i64> = planner.missed(&entries, now).iter().map(|e| e.doc_id).collect();
        assert_eq!(missed, vec![3, 2]);
    }
}
