//! Background reminder worker: restores pending notifications at startup and
//! delivers them as they fall due.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::state::AppState;
use fyle_remind::PlannedNotification;

/// Start the background reminder worker task.
pub fn start_reminder_worker(state: Arc<AppState>) {
    let scan_secs = state.config.reminder_scan_secs;

    tokio::spawn(async move {
        let catchup_state = state.clone();
        let restored = tokio::task::spawn_blocking(move || catch_up(&catchup_state, Utc::now())).await;
        if let Err(e) = restored {
            error!("Reminder catch-up task failed: {}", e);
        }

        info!("Background reminder worker started (every {}s)", scan_secs);
        let mut interval = tokio::time::interval(Duration::from_secs(scan_secs));
        loop {
            interval.tick().await;
            deliver_due(&state, Utc::now());
        }
    });
}

/// Re-plan every future reminder and queue one catch-up notification per
/// missed reminder. Runs once per process, so a missed reminder is announced
/// once rather than on every scan.
pub fn catch_up(state: &AppState, now: DateTime<Utc>) {
    match state.reminders.resync(&state.store, now) {
        Ok(n) => info!("Restored {} pending notifications", n),
        Err(e) => error!("Reminder resync failed: {}", e),
    }
    match state.reminders.schedule_missed(&state.store, now) {
        Ok(missed) if !missed.is_empty() => {
            info!("{} reminders were missed while offline", missed.len())
        }
        Ok(_) => {}
        Err(e) => warn!("Could not schedule missed reminders: {}", e),
    }
}

/// Deliver every notification due at `now`. Delivery is a log line.
pub fn deliver_due(state: &AppState, now: DateTime<Utc>) -> Vec<PlannedNotification> {
    let due = state.sink.take_due(now);
    for n in &due {
        if n.critical {
            warn!(doc_id = n.doc_id, id = %n.id, "{}: {}", n.title, n.body);
        } else {
            info!(doc_id = n.doc_id, id = %n.id, "{}: {}", n.title, n.body);
        }
    }
    due
}
