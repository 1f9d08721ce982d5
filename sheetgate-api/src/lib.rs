//! sheetgate-api library
//!
//! Gates sheet-music downloads behind proof of a YouTube channel
//! subscription. A single protected route walks the credential chain
//! (Auth0 access token -> stored Google token -> YouTube subscriptions)
//! and reports the result.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod auth;
pub mod services;

use auth::TokenVerifier;
use services::{Auth0Client, YouTubeClient};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Verifies inbound bearer tokens
    pub verifier: Arc<TokenVerifier>,
    /// Management API client (stored Google tokens live behind it)
    pub auth0: Arc<Auth0Client>,
    /// Subscription lookups
    pub youtube: Arc<YouTubeClient>,
    /// The channel whose subscribers get access
    pub channel_id: String,
    /// Browser origin allowed to call this API
    pub allowed_origin: String,
}

/// Build application router
///
/// `/api/check-subscriber` sits behind the bearer-token middleware;
/// `/health` stays open.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::get;

    let protected = Router::new()
        .route("/api/check-subscriber", get(api::check_subscriber))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let public = api::health_routes();

    let cors = cors_layer(&state.allowed_origin);

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS for the browser client; restricted to the configured origin
///
/// Config validation rejects unparsable origins at startup; if one slips
/// through anyway, no origin is granted rather than all of them.
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Err(_) => {
            warn!(
                origin = %allowed_origin,
                "Invalid allowed_origin, CORS disabled"
            );
            CorsLayer::new()
        }
    }
}
