//! Redirect integration tests
//!
//! These tests verify that the redirect listener resolves live links, reports
//! expired and unknown codes distinctly, and counts concurrent redirects.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Duration;
use std::sync::Arc;
use tinylink::config::StoreConfig;
use tinylink::models::NewLink;
use tinylink::redirect;
use tinylink::storage::{ManualClock, MemoryStorage, Storage, StoreError};
use tower::ServiceExt;

/// Helper to create test storage with a controllable clock
fn create_test_storage() -> (Arc<dyn Storage>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let storage = MemoryStorage::with_clock(StoreConfig::default(), clock.clone());
    (Arc::new(storage), clock)
}

fn redirect_request(code: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/{}", code))
        .header(header::USER_AGENT, "redirect-test")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_redirect_active_url() {
    let (storage, _) = create_test_storage();
    storage
        .create(NewLink::new("https://example.com/destination").requested_code("redirect_test"))
        .unwrap();

    let app = redirect::create_redirect_router(storage.clone(), "cf-ipcountry".to_string());
    let response = app.oneshot(redirect_request("redirect_test")).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/destination"
    );

    let links = storage.list();
    assert_eq!(links[0].clicks.len(), 1);
    assert_eq!(links[0].clicks[0].source, "redirect-test");
    assert_eq!(links[0].clicks[0].location, "unknown");
}

#[tokio::test]
async fn test_redirect_expired_url_is_gone() {
    let (storage, clock) = create_test_storage();
    storage
        .create(
            NewLink::new("https://example.com/old")
                .ttl_minutes(1.0)
                .requested_code("lapsed"),
        )
        .unwrap();
    clock.advance(Duration::minutes(2));

    let app = redirect::create_redirect_router(storage.clone(), "cf-ipcountry".to_string());
    let response = app.oneshot(redirect_request("lapsed")).await.unwrap();

    assert_eq!(response.status(), StatusCode::GONE);
    assert!(storage.list()[0].clicks.is_empty());
}

#[tokio::test]
async fn test_redirect_unknown_code() {
    let (storage, _) = create_test_storage();
    let app = redirect::create_redirect_router(storage, "cf-ipcountry".to_string());

    let response = app.oneshot(redirect_request("nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_redirects() {
    // Test that many simultaneous redirects each record exactly one click
    let (storage, _) = create_test_storage();
    storage
        .create(NewLink::new("https://example.com/concurrent").requested_code("concurrent_redirect"))
        .unwrap();

    let app = redirect::create_redirect_router(storage.clone(), "cf-ipcountry".to_string());

    let mut handles = vec![];
    for i in 0..50 {
        let app_clone = app.clone();
        let handle = tokio::spawn(async move {
            let request = Request::builder()
                .uri("/concurrent_redirect")
                .header(header::USER_AGENT, format!("client-{}", i))
                .header("cf-ipcountry", "FR")
                .body(Body::empty())
                .unwrap();
            app_clone.oneshot(request).await.unwrap()
        });
        handles.push(handle);
    }

    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    let link = storage.list().into_iter().next().unwrap();
    assert_eq!(link.clicks.len(), 50);
    assert!(link.clicks.iter().all(|c| c.location == "FR"));
}

#[tokio::test]
async fn test_redirect_health_check() {
    let (storage, _) = create_test_storage();
    let app = redirect::create_redirect_router(storage, "cf-ipcountry".to_string());

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_redirect_destinations_are_header_safe() {
    let (storage, _) = create_test_storage();

    let rejected = storage.create(NewLink::new("https://example.com/a\nb").requested_code("nl"));
    assert!(matches!(rejected, Err(StoreError::InvalidInput(_))));

    storage
        .create(NewLink::new("https://example.com/ä b").requested_code("unicode"))
        .unwrap();

    let app = redirect::create_redirect_router(storage.clone(), "cf-ipcountry".to_string());

    let response = app.clone().oneshot(redirect_request("nl")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(redirect_request("unicode")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/%C3%A4%20b"
    );

    let links = storage.list();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].original_url, "https://example.com/ä b");
    assert_eq!(links[0].clicks.len(), 1);
}
