//! Reminder views.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use chrono::Utc;

use super::{error_reply, json_reply, Reply};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reminders", get(grouped))
        .route("/reminders/upcoming", get(upcoming))
        .route("/reminders/missed", get(missed))
}

/// GET /api/reminders: past due, this month, later.
async fn grouped(State(state): State<Arc<AppState>>) -> Reply {
    match state.reminders.groups(&state.store, Utc::now()) {
        Ok(groups) => json_reply(StatusCode::OK, &groups),
        Err(e) => error_reply(&e),
    }
}

/// GET /api/reminders/upcoming: the next seven days.
async fn upcoming(State(state): State<Arc<AppState>>) -> Reply {
    match state.reminders.upcoming(&state.store, Utc::now()) {
        Ok(digest) => json_reply(StatusCode::OK, &digest),
        Err(e) => error_reply(&e),
    }
}

async fn missed(State(state): State<Arc<AppState>>) -> Reply {
    match state.reminders.missed(&state.store, Utc::now()) {
        Ok(missed) => json_reply(StatusCode::OK, &missed),
        Err(e) => error_reply(&e),
    }
}
