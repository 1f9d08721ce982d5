//! Bearer-token middleware for protected routes

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use sheetgate_common::api::types::ErrorResponse;
use tracing::debug;

use super::VerifyError;
use crate::AppState;

/// Authentication middleware
///
/// Extracts the `Authorization: Bearer` token, verifies it, and attaches
/// the claims as a request extension. Failures short-circuit with 401.
///
/// **Note:** applied to protected routes only; `/health` stays open.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(&request).ok_or(AuthError::MissingToken)?;

    let claims = state.verifier.verify(token).await.map_err(|e| {
        debug!("Token verification failed: {}", e);
        match e {
            VerifyError::JwksFetch(msg) => AuthError::JwksUnavailable(msg),
            other => AuthError::InvalidToken(other.to_string()),
        }
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Pull the bearer token out of the Authorization header, if present
fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
    JwksUnavailable(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Missing bearer token".to_string(),
            ),
            AuthError::InvalidToken(msg) => {
                (StatusCode::UNAUTHORIZED, format!("Invalid token: {}", msg))
            }
            AuthError::JwksUnavailable(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Unable to verify token: {}", msg),
            ),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
