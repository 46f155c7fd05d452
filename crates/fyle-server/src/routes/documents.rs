//! Document routes: ingest, browse, edit, delete, favorite, snooze.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use super::{bad_request, error_reply, json_reply, not_found, Reply};
use crate::state::AppState;
use fyle_ingest::{DocumentSource, IngestOptions, NoRecognizer};
use fyle_remind::{NotificationSink, SnoozeDuration};
use fyle_store::{DocumentFilter, DocumentUpdate};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/documents", get(list_documents).post(create_document))
        .route(
            "/documents/{id}",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/documents/{id}/favorite", post(toggle_favorite))
        .route("/documents/{id}/snooze", post(snooze))
        .route("/documents/{id}/notifications", get(notifications))
}

#[derive(Deserialize)]
struct CreateDocumentBody {
    #[serde(default)]
    text: String,
    name: Option<String>,
    category_ids: Option<Vec<i64>>,
    expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    is_favorite: bool,
    pdf_base64: Option<String>,
    thumbnail_base64: Option<String>,
}

#[derive(Deserialize)]
struct FavoriteBody {
    favorite: Option<bool>,
}

#[derive(Deserialize)]
struct SnoozeBody {
    duration: SnoozeDuration,
}

fn decode_field(field: &str, value: Option<String>) -> Result<Option<Vec<u8>>, Reply> {
    match value {
        None => Ok(None),
        Some(raw) => STANDARD
            .decode(raw.as_bytes())
            .map(Some)
            .map_err(|e| bad_request(format!("Invalid base64 in {}: {}", field, e))),
    }
}

/// GET /api/documents?q=&favorites=&received=
async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<DocumentFilter>,
) -> Reply {
    match state.store.list_documents(&filter) {
        Ok(docs) => json_reply(StatusCode::OK, &docs),
        Err(e) => error_reply(&e),
    }
}

/// POST /api/documents: extract fields from recognized text (or the PDF's
/// own text layer when no text is sent), store the document, and plan its
/// reminders.
async fn create_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateDocumentBody>,
) -> Reply {
    let pdf_data = match decode_field("pdf_base64", body.pdf_base64) {
        Ok(v) => v,
        Err(reply) => return reply,
    };
    let thumbnail = match decode_field("thumbnail_base64", body.thumbnail_base64) {
        Ok(v) => v,
        Err(reply) => return reply,
    };

    let source = match (&pdf_data, body.text.trim().is_empty()) {
        (Some(bytes), true) => DocumentSource::from_pdf(bytes),
        _ => DocumentSource::from_text(body.text),
    };

    let options = IngestOptions {
        name: body.name,
        category_ids: body.category_ids,
        expiry_date: body.expiry_date,
        is_favorite: body.is_favorite,
        pdf_data,
        thumbnail,
    };

    let now = Utc::now();
    let ingested = match state
        .ingester()
        .ingest_source(&source, &NoRecognizer, options, now)
    {
        Ok(i) => i,
        Err(e) => return error_reply(&e),
    };
    let document = match state.store.get_document(ingested.doc_id) {
        Ok(Some(doc)) => doc,
        Ok(None) => return not_found("Document"),
        Err(e) => return error_reply(&e),
    };
    let planned = match state.reminders.schedule_document(&document, now) {
        Ok(p) => p,
        Err(e) => return error_reply(&e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "document": document,
            "extraction": ingested.extraction,
            "notifications": planned,
        })),
    )
}

/// GET /api/documents/{id}
async fn get_document(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Reply {
    match state.store.get_document(id) {
        Ok(Some(doc)) => json_reply(StatusCode::OK, &doc),
        Ok(None) => not_found("Document"),
        Err(e) => error_reply(&e),
    }
}

/// PUT /api/documents/{id}: partial update; reminders are re-planned.
async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<DocumentUpdate>,
) -> Reply {
    match state.store.update_document(id, &update) {
        Ok(true) => {}
        Ok(false) => return not_found("Document"),
        Err(e) => return error_reply(&e),
    }
    let document = match state.store.get_document(id) {
        Ok(Some(doc)) => doc,
        Ok(None) => return not_found("Document"),
        Err(e) => return error_reply(&e),
    };
    if let Err(e) = state.reminders.schedule_document(&document, Utc::now()) {
        return error_reply(&e);
    }
    json_reply(StatusCode::OK, &document)
}

/// DELETE /api/documents/{id}: also cancels pending notifications.
async fn delete_document(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Reply {
    match state.store.delete_document(id) {
        Ok(true) => {
            if let Err(e) = state.reminders.cancel_document(id) {
                warn!("Failed to cancel notifications for {}: {}", id, e);
            }
            info!("Deleted document {}", id);
            (
                StatusCode::OK,
                Json(serde_json::json!({ "deleted": true, "id": id })),
            )
        }
        Ok(false) => not_found("Document"),
        Err(e) => error_reply(&e),
    }
}

/// POST /api/documents/{id}/favorite: `{"favorite": bool}`, or toggle when
/// the body is empty.
async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Reply {
    let requested = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<FavoriteBody>(&body) {
            Ok(b) => b.favorite,
            Err(e) => return bad_request(format!("Invalid body: {}", e)),
        }
    };

    let current = match state.store.get_document(id) {
        Ok(Some(doc)) => doc,
        Ok(None) => return not_found("Document"),
        Err(e) => return error_reply(&e),
    };
    let favorite = requested.unwrap_or(!current.is_favorite);
    if let Err(e) = state.store.set_favorite(id, favorite) {
        return error_reply(&e);
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({ "id": id, "is_favorite": favorite })),
    )
}

/// POST /api/documents/{id}/snooze: `{"duration": "hour" | "day"}`.
async fn snooze(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<SnoozeBody>,
) -> Reply {
    match state
        .reminders
        .snooze(&state.store, id, body.duration, Utc::now())
    {
        Ok(Some(document)) => {
            let pending = state.sink.pending_for(id);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "document": document,
                    "notifications": pending,
                })),
            )
        }
        Ok(None) => not_found("Document"),
        Err(e) => error_reply(&e),
    }
}

/// GET /api/documents/{id}/notifications: pending notifications in firing order.
async fn notifications(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Reply {
    match state.store.get_document(id) {
        Ok(Some(_)) => json_reply(StatusCode::OK, &state.sink.pending_for(id)),
        Ok(None) => not_found("Document"),
        Err(e) => error_reply(&e),
    }
}
