//! Stats route.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::{error_reply, Reply};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/stats", get(get_stats))
}

/// GET /api/stats: storage and reminder statistics.
async fn get_stats(State(state): State<Arc<AppState>>) -> Reply {
    let stats = match state.store.get_stats() {
        Ok(s) => s,
        Err(e) => return error_reply(&e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "documents": stats.total_documents,
            "categories": stats.total_categories,
            "favorites": stats.favorites,
            "received": stats.received,
            "withReminders": stats.with_reminders,
            "pendingNotifications": state.sink.len(),
            "catalogVersion": stats.catalog_version,
            "dbPath": stats.db_path,
            "dbSizeMb": stats.db_size_mb,
            "reminderHour": state.reminders.planner().reminder_hour(),
            "port": state.config.port,
        })),
    )
}
