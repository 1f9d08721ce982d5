//! YouTube Data API v3 client
//!
//! One call: `subscriptions.list` with `mine=true` and `forChannelId`,
//! authorized by the user's own Google access token. An empty `items`
//! array is a successful "not subscribed", not an error.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// YouTube client errors
#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("YouTube API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// subscriptions.list response, reduced to the fields this service reads
#[derive(Debug, Deserialize)]
struct SubscriptionListResponse {
    #[serde(default)]
    items: Vec<Subscription>,
}

#[derive(Debug, Deserialize)]
struct Subscription {
    snippet: SubscriptionSnippet,
}

/// Snippet of a subscription to the configured channel
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionSnippet {
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Error body shape returned by Google APIs
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// YouTube Data API client
pub struct YouTubeClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl YouTubeClient {
    pub fn new() -> Result<Self, YouTubeError> {
        Self::with_base_url(YOUTUBE_API_BASE.to_string())
    }

    /// Create a client against a non-default API base (for tests)
    pub fn with_base_url(base_url: String) -> Result<Self, YouTubeError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| YouTubeError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Check whether the token's owner subscribes to `channel_id`
    ///
    /// Returns the subscription snippet when subscribed, `None` otherwise.
    pub async fn subscription_to_channel(
        &self,
        google_access_token: &str,
        channel_id: &str,
    ) -> Result<Option<SubscriptionSnippet>, YouTubeError> {
        let url = format!("{}/subscriptions", self.base_url);

        debug!(
            channel_id = %channel_id,
            token_len = google_access_token.len(),
            "Querying YouTube subscriptions"
        );

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("forChannelId", channel_id),
                ("mine", "true"),
            ])
            .bearer_auth(google_access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| YouTubeError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or(text);
            return Err(YouTubeError::ApiError(status.as_u16(), message));
        }

        let list: SubscriptionListResponse = response
            .json()
            .await
            .map_err(|e| YouTubeError::ParseError(e.to_string()))?;

        Ok(list.items.into_iter().next().map(|s| s.snippet))
    }
}
