//! Shared API request/response types
//!
//! The wire format is camelCase JSON; these shapes are what the browser
//! client consumes, so field names are load-bearing.

use serde::{Deserialize, Serialize};

/// Response body for `GET /api/check-subscriber`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSubscriberResponse {
    /// Whether the authenticated user subscribes to the configured channel
    pub is_subscribed: bool,

    /// Present only when subscribed
    pub subscription_details: Option<SubscriptionDetails>,

    /// The channel that was checked
    pub channel_id: String,
}

/// Details of an existing subscription, from the video platform's snippet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDetails {
    /// RFC 3339 timestamp the subscription was created
    pub subscribed_at: String,
    pub channel_title: String,
    pub channel_description: String,
}

/// Standard error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
