use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::models::{CreateUrlRequest, NewLink, ResolveResponse, ShortLink};
use crate::redirect::visitor_from_headers;
use crate::storage::{Storage, StoreError};

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub location_header: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a store outcome to an HTTP status and JSON error body
pub fn error_response(err: StoreError) -> ApiError {
    let status = match &err {
        StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        StoreError::CodeConflict(_) => StatusCode::CONFLICT,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Expired(_) => StatusCode::GONE,
        StoreError::CodeSpaceExhausted => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Create a new short link
pub async fn create_url(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<ShortLink>), ApiError> {
    let link = state
        .storage
        .create(NewLink::from(payload))
        .map_err(|e| {
            tracing::debug!(error = %e, "create rejected");
            error_response(e)
        })?;

    tracing::info!(short_code = %link.short_code, "short link created");
    Ok((StatusCode::CREATED, Json(link)))
}

/// Resolve a short code without redirecting; records a click
pub async fn resolve_url(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ResolveResponse>, ApiError> {
    let visitor = visitor_from_headers(&headers, &state.location_header);
    let original_url = state
        .storage
        .resolve(&code, visitor)
        .map_err(error_response)?;

    Ok(Json(ResolveResponse { original_url }))
}

/// Every link with its click history, in creation order
pub async fn list_urls(State(state): State<Arc<AppState>>) -> Json<Vec<ShortLink>> {
    Json(state.storage.list())
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
