//! Field extraction without storing anything.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use super::{error_reply, json_reply, Reply};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/extract", post(extract))
}

#[derive(Deserialize)]
struct ExtractBody {
    #[serde(default)]
    text: String,
}

/// POST /api/extract: run the extractor against the stored categories.
async fn extract(State(state): State<Arc<AppState>>, Json(body): Json<ExtractBody>) -> Reply {
    match state.ingester().extract(&body.text, Utc::now()) {
        Ok(result) => json_reply(StatusCode::OK, &result),
        Err(e) => error_reply(&e),
    }
}
