//! Integration tests for sheetgate-api endpoints
//!
//! Tests cover:
//! - Health endpoint (no auth required)
//! - Bearer-token middleware rejection paths
//! - Routing and method handling
//!
//! The happy path through Auth0 and YouTube needs live credentials and is
//! exercised by unit tests on the clients' parsing/mapping instead.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method

use sheetgate_api::auth::TokenVerifier;
use sheetgate_api::services::{Auth0Client, YouTubeClient};
use sheetgate_api::{build_router, AppState};

/// Structurally valid RS256 JWT (kid "test-key", garbage signature).
/// Gets past header parsing so requests reach the JWKS lookup.
const WELL_FORMED_TOKEN: &str = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCIsImtpZCI6InRlc3Qta2V5In0.eyJzdWIiOiJnb29nbGUtb2F1dGgyfDEyMzQiLCJpc3MiOiJodHRwczovL2Rldi10ZW5hbnQudXMuYXV0aDAuY29tLyIsImF1ZCI6Imh0dHBzOi8vZGV2LXRlbmFudC51cy5hdXRoMC5jb20vYXBpL3YyLyIsImV4cCI6NDEwMjQ0NDgwMH0.c2ln";

/// Test helper: app wired against unreachable upstreams.
/// Port 9 (discard) refuses connections immediately.
fn setup_app() -> axum::Router {
    setup_app_with_origin("http://localhost:3000")
}

fn setup_app_with_origin(allowed_origin: &str) -> axum::Router {
    let verifier = TokenVerifier::new(
        "http://127.0.0.1:9/.well-known/jwks.json".to_string(),
        "https://dev-tenant.us.auth0.com/".to_string(),
        "https://dev-tenant.us.auth0.com/api/v2/".to_string(),
    );

    let auth0 = Auth0Client::new(
        "http://127.0.0.1:9/oauth/token".to_string(),
        "http://127.0.0.1:9/api/v2".to_string(),
        "client-id".to_string(),
        "client-secret".to_string(),
    )
    .expect("Should create Auth0 client");

    let youtube = YouTubeClient::with_base_url("http://127.0.0.1:9/youtube/v3".to_string())
        .expect("Should create YouTube client");

    let state = AppState {
        verifier: Arc::new(verifier),
        auth0: Arc::new(auth0),
        youtube: Arc::new(youtube),
        channel_id: "UCtest".to_string(),
        allowed_origin: allowed_origin.to_string(),
    };

    build_router(state)
}

/// Test helper: GET request with optional Authorization header
fn get_request(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health endpoint
// =============================================================================

#[tokio::test]
async fn health_endpoint_requires_no_auth() {
    let app = setup_app();

    let response = app.oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "sheetgate-api");
    assert!(body["version"].is_string());
}

// =============================================================================
// Bearer-token middleware
// =============================================================================

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = setup_app();

    let response = app
        .oneshot(get_request("/api/check-subscriber", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("Missing bearer token"));
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() {
    let app = setup_app();

    let response = app
        .oneshot(get_request("/api/check-subscriber", Some("Basic dXNlcjpwYXNz")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = setup_app();

    let response = app
        .oneshot(get_request(
            "/api/check-subscriber",
            Some("Bearer not-a-jwt-at-all"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid token"));
}

#[tokio::test]
async fn well_formed_token_with_unreachable_jwks_is_server_error() {
    let app = setup_app();

    let auth = format!("Bearer {}", WELL_FORMED_TOKEN);
    let response = app
        .oneshot(get_request("/api/check-subscriber", Some(&auth)))
        .await
        .unwrap();

    // Signature cannot be checked at all, so this is a 500, not a 401
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("Unable to verify token"));
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn cors_allows_only_the_configured_origin() {
    let app = setup_app();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
}

#[tokio::test]
async fn invalid_allowed_origin_grants_nothing() {
    // An origin that cannot be a header value must not widen CORS
    let app = setup_app_with_origin("http://localhost:3000\n");

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = setup_app();

    let response = app.oneshot(get_request("/api/nope", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_without_token_is_unauthorized() {
    let app = setup_app();

    // The auth layer wraps the whole protected router, so an
    // unauthenticated POST is rejected before method dispatch runs.
    let request = Request::builder()
        .method("POST")
        .uri("/api/check-subscriber")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
