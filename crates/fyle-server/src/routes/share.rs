//! Share payload export and import.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tracing::warn;

use super::{error_reply, json_reply, not_found, Reply};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/share/{id}", get(export))
        .route("/share/{id}/export", post(write_export))
        .route("/share/import", post(import))
}

/// GET /api/share/{id}: the document as a share payload.
async fn export(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Reply {
    match state.exchange().export(id) {
        Ok(Some(shared)) => json_reply(StatusCode::OK, &shared),
        Ok(None) => not_found("Document"),
        Err(e) => error_reply(&e),
    }
}

/// POST /api/share/{id}/export: write the payload into the exports directory.
async fn write_export(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Reply {
    let exports = state.config.data_paths.exports.clone();
    match state.exchange().write_export(id, &exports) {
        Ok(Some(payload)) => json_reply(StatusCode::CREATED, &payload),
        Ok(None) => not_found("Document"),
        Err(e) => error_reply(&e),
    }
}

/// POST /api/share/import: store a received payload and plan its reminders.
async fn import(State(state): State<Arc<AppState>>, body: Bytes) -> Reply {
    let outcome = match state.exchange().import_bytes(&body) {
        Ok(o) => o,
        Err(e) => return error_reply(&e),
    };

    let document = match state.store.get_document(outcome.doc_id) {
        Ok(doc) => doc,
        Err(e) => return error_reply(&e),
    };
    if let Some(doc) = &document {
        if let Err(e) = state.reminders.schedule_document(doc, Utc::now()) {
            warn!("Failed to plan reminders for received {}: {}", doc.id, e);
        }
    }

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "import": outcome,
            "document": document,
        })),
    )
}
