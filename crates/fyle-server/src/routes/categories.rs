//! Category routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::{bad_request, error_reply, json_reply, not_found, Reply};
use crate::state::AppState;
use fyle_core::catalog::{DEFAULT_COLOR, DEFAULT_ICON};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}/documents", get(category_documents))
}

#[derive(Deserialize)]
struct CreateCategoryBody {
    name: String,
    icon: Option<String>,
    color: Option<String>,
}

/// GET /api/categories: every category with its document count.
async fn list_categories(State(state): State<Arc<AppState>>) -> Reply {
    match state.store.category_counts() {
        Ok(categories) => json_reply(StatusCode::OK, &categories),
        Err(e) => error_reply(&e),
    }
}

/// POST /api/categories
async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCategoryBody>,
) -> Reply {
    let name = body.name.trim();
    if name.is_empty() {
        return bad_request("Category name is required");
    }
    let icon = body.icon.as_deref().unwrap_or(DEFAULT_ICON);
    let color = body.color.as_deref().unwrap_or(DEFAULT_COLOR);
    match state.store.create_category(name, icon, color) {
        Ok(category) => json_reply(StatusCode::CREATED, &category),
        Err(e) => error_reply(&e),
    }
}

/// GET /api/categories/{id}/documents
async fn category_documents(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Reply {
    match state.store.get_category(id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Category"),
        Err(e) => return error_reply(&e),
    }
    match state.store.documents_in_category(id) {
        Ok(docs) => json_reply(StatusCode::OK, &docs),
        Err(e) => error_reply(&e),
    }
}
