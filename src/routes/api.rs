use axum::Json;
use axum::extract::{Path, State};

use ogserve_content::{ContentKind, ContentRecord};

use crate::error::ApiError;
use crate::routes::AppState;

pub async fn list_posts(State(state): State<AppState>) -> Json<Vec<ContentRecord>> {
    Json(state.store.list(ContentKind::Post))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContentRecord>, ApiError> {
    find(&state, ContentKind::Post, &id)
}

pub async fn list_products(State(state): State<AppState>) -> Json<Vec<ContentRecord>> {
    Json(state.store.list(ContentKind::Product))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContentRecord>, ApiError> {
    find(&state, ContentKind::Product, &id)
}

// ids arrive as raw strings so "abc" is a plain 404 instead of an extractor rejection
fn find(state: &AppState, kind: ContentKind, id: &str) -> Result<Json<ContentRecord>, ApiError> {
    state
        .store
        .find_segment(kind, id)
        .map(Json)
        .ok_or(ApiError::NotFound(kind))
}
