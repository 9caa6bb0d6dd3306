use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

use crate::models::Visitor;
use crate::storage::{Storage, StoreError};

pub struct RedirectState {
    pub storage: Arc<dyn Storage>,
    pub location_header: String,
}

/// Build the click attribution from request headers.
///
/// `source` is the User-Agent. `location` comes from a header set by an
/// upstream proxy or geolocation service, if any.
pub fn visitor_from_headers(headers: &HeaderMap, location_header: &str) -> Visitor {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    Visitor {
        source: header_value(header::USER_AGENT.as_str()),
        location: header_value(location_header),
    }
}

/// ASCII form of the destination, safe for a `Location` header
fn location_for(original_url: &str) -> String {
    Url::parse(original_url)
        .map(String::from)
        .unwrap_or_else(|_| original_url.to_string())
}

/// Redirect to original URL
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let visitor = visitor_from_headers(&headers, &state.location_header);

    match state.storage.resolve(&code, visitor) {
        // Temporary: the mapping expires, so clients must not cache it
        Ok(original_url) => Redirect::temporary(&location_for(&original_url)).into_response(),
        Err(StoreError::Expired(_)) => {
            (StatusCode::GONE, "This link has expired").into_response()
        }
        Err(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "URL not found").into_response(),
        Err(e) => {
            tracing::warn!(short_code = %code, error = %e, "unexpected resolve failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
