//! Subscription check endpoint
//!
//! `GET /api/check-subscriber` walks the credential chain: verified claims
//! give the user id, the management API gives the stored Google token, and
//! the YouTube API answers whether that user subscribes to the configured
//! channel.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sheetgate_common::api::types::{
    CheckSubscriberResponse, ErrorResponse, SubscriptionDetails,
};
use tracing::{error, info};

use crate::auth::Claims;
use crate::services::auth0_client::Auth0Error;
use crate::services::youtube_client::YouTubeError;
use crate::AppState;

/// GET /api/check-subscriber
///
/// Requires a verified bearer token (see [`crate::auth::auth_middleware`]).
pub async fn check_subscriber(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<CheckSubscriberResponse>, SubscriberError> {
    let user_id = claims.sub.as_deref().ok_or(SubscriberError::NoUserId)?;

    let google_token = state.auth0.google_token_for(user_id).await?;

    let snippet = state
        .youtube
        .subscription_to_channel(&google_token, &state.channel_id)
        .await?;

    let is_subscribed = snippet.is_some();
    info!(user_id = %user_id, subscribed = is_subscribed, "Subscription check complete");

    let subscription_details = snippet.map(|s| SubscriptionDetails {
        subscribed_at: s.published_at.unwrap_or_default(),
        channel_title: s.title,
        channel_description: s.description,
    });

    Ok(Json(CheckSubscriberResponse {
        is_subscribed,
        subscription_details,
        channel_id: state.channel_id.clone(),
    }))
}

/// Failures of the check-subscriber pipeline, mapped to HTTP statuses
#[derive(Debug)]
pub enum SubscriberError {
    /// Token verified but carries no usable subject claim
    NoUserId,
    /// User has no linked Google identity with a stored token
    NoGoogleIdentity,
    /// Identity platform failure (token exchange or profile fetch)
    IdentityPlatform(String),
    /// Video platform failure
    VideoPlatform(String),
}

impl From<Auth0Error> for SubscriberError {
    fn from(e: Auth0Error) -> Self {
        match e {
            Auth0Error::NoGoogleIdentity => SubscriberError::NoGoogleIdentity,
            other => SubscriberError::IdentityPlatform(other.to_string()),
        }
    }
}

impl From<YouTubeError> for SubscriberError {
    fn from(e: YouTubeError) -> Self {
        SubscriberError::VideoPlatform(e.to_string())
    }
}

impl IntoResponse for SubscriberError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SubscriberError::NoUserId => (
                StatusCode::BAD_REQUEST,
                "User ID not found in token".to_string(),
            ),
            SubscriberError::NoGoogleIdentity => (
                StatusCode::BAD_REQUEST,
                "Google access token not found. Please logout and login again with Google."
                    .to_string(),
            ),
            SubscriberError::IdentityPlatform(msg) => {
                error!("Identity platform failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to check subscriber status".to_string(),
                )
            }
            SubscriberError::VideoPlatform(msg) => {
                error!("YouTube API failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "YouTube API request failed".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth0_errors_map_to_expected_variants() {
        assert!(matches!(
            SubscriberError::from(Auth0Error::NoGoogleIdentity),
            SubscriberError::NoGoogleIdentity
        ));
        assert!(matches!(
            SubscriberError::from(Auth0Error::TokenExchange(403, "denied".to_string())),
            SubscriberError::IdentityPlatform(_)
        ));
    }

    #[test]
    fn statuses_match_contract() {
        let resp = SubscriberError::NoUserId.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = SubscriberError::NoGoogleIdentity.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = SubscriberError::IdentityPlatform("boom".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = SubscriberError::VideoPlatform("quota".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
