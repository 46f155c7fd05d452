//! HTTP route handlers.

pub mod categories;
pub mod documents;
pub mod extract;
pub mod reminders;
pub mod share;
pub mod stats;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::state::AppState;
use fyle_core::Error;

/// JSON reply used by every handler.
pub type Reply = (StatusCode, Json<serde_json::Value>);

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(stats::routes())
        .merge(extract::routes())
        .merge(categories::routes())
        .merge(documents::routes())
        .merge(reminders::routes())
        .merge(share::routes())
}

/// Map a domain error to a status code and `{"error": ...}` body.
pub fn error_reply(err: &Error) -> Reply {
    let status = match err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::DuplicateContent(_) => StatusCode::CONFLICT,
        Error::Share(_) | Error::Json(_) | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", err);
    }
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

pub fn not_found(what: &str) -> Reply {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("{} not found", what) })),
    )
}

pub fn bad_request(message: impl Into<String>) -> Reply {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

/// Serialize a value into a reply with the given status.
pub fn json_reply<T: serde::Serialize>(status: StatusCode, value: &T) -> Reply {
    match serde_json::to_value(value) {
        Ok(v) => (status, Json(v)),
        Err(e) => error_reply(&Error::Json(e)),
    }
}
