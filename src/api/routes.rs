use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::storage::Storage;

use super::handlers::{create_url, health_check, list_urls, resolve_url, AppState};

pub fn create_api_router(storage: Arc<dyn Storage>, location_header: String) -> Router {
    let state = Arc::new(AppState {
        storage,
        location_header,
    });

    let api_routes = Router::new()
        .route("/shorten", post(create_url))
        .route("/resolve/{code}", get(resolve_url))
        .route("/statistics", get(list_urls))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
