//! Auth0 Management API client
//!
//! Two jobs: exchange the service's M2M credentials for a management token
//! (client_credentials grant), and fetch a user's profile to recover the
//! Google access token stored on their `google-oauth2` identity.
//!
//! The management token is cached until shortly before expiry; each token
//! is good for many requests and the exchange is pure overhead otherwise.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Refresh the management token this long before it actually expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Auth0 client errors
#[derive(Debug, Error)]
pub enum Auth0Error {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Token exchange failed ({0}): {1}")]
    TokenExchange(u16, String),

    #[error("Management API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No linked Google identity with a stored access token")]
    NoGoogleIdentity,
}

/// client_credentials grant request body
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'static str,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// User profile, reduced to the fields this service reads
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub identities: Vec<Identity>,
}

/// One federated identity on a user profile
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub provider: String,
    #[serde(default)]
    pub connection: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl UserProfile {
    /// The stored Google access token, if the user logged in via Google
    pub fn google_access_token(&self) -> Option<&str> {
        self.identities
            .iter()
            .find(|i| i.provider == "google-oauth2")
            .and_then(|i| i.access_token.as_deref())
    }
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// How long a token may be served from cache: its lifetime minus the
/// safety margin. Zero means "use once, never cache".
fn cache_ttl(expires_in: Option<u64>) -> Duration {
    Duration::from_secs(expires_in.unwrap_or(0)).saturating_sub(TOKEN_EXPIRY_MARGIN)
}

/// Auth0 Management API client
pub struct Auth0Client {
    http_client: reqwest::Client,
    token_url: String,
    management_api_base: String,
    client_id: String,
    client_secret: String,
    audience: String,
    cached_token: Mutex<Option<CachedToken>>,
}

impl Auth0Client {
    /// Create a client for the given tenant
    ///
    /// `token_url` and `management_api_base` are normally derived from the
    /// tenant domain; they are injectable so tests can point elsewhere.
    pub fn new(
        token_url: String,
        management_api_base: String,
        client_id: String,
        client_secret: String,
    ) -> Result<Self, Auth0Error> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Auth0Error::NetworkError(e.to_string()))?;

        // The management API audience is the API base with a trailing slash
        let audience = format!("{}/", management_api_base.trim_end_matches('/'));

        Ok(Self {
            http_client,
            token_url,
            management_api_base,
            client_id,
            client_secret,
            audience,
            cached_token: Mutex::new(None),
        })
    }

    /// Get a management API token, reusing the cached one while valid
    async fn management_token(&self) -> Result<String, Auth0Error> {
        let mut cached = self.cached_token.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry.is_fresh(Instant::now()) {
                return Ok(entry.token.clone());
            }
        }

        let token = self.exchange_credentials().await?;
        let ttl = cache_ttl(token.expires_in);

        if !ttl.is_zero() {
            *cached = Some(CachedToken {
                token: token.access_token.clone(),
                expires_at: Instant::now() + ttl,
            });
            debug!("Cached management token for {:?}", ttl);
        }

        Ok(token.access_token)
    }

    /// client_credentials grant against the tenant token endpoint
    async fn exchange_credentials(&self) -> Result<TokenResponse, Auth0Error> {
        let body = TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            audience: &self.audience,
            grant_type: "client_credentials",
        };

        let response = self
            .http_client
            .post(&self.token_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Auth0Error::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Auth0Error::TokenExchange(status.as_u16(), text));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Auth0Error::ParseError(e.to_string()))?;

        info!("Obtained management API token (len {})", token.access_token.len());

        Ok(token)
    }

    /// Fetch a user profile from the management API
    pub async fn user_profile(&self, user_id: &str) -> Result<UserProfile, Auth0Error> {
        let mgmt_token = self.management_token().await?;

        // User ids contain `|` (e.g. google-oauth2|1234), so encode the path segment
        let url = format!(
            "{}/users/{}",
            self.management_api_base,
            urlencoding::encode(user_id)
        );

        debug!(user_id = %user_id, "Fetching user profile");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&mgmt_token)
            .send()
            .await
            .map_err(|e| Auth0Error::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Auth0Error::ApiError(status.as_u16(), text));
        }

        response
            .json()
            .await
            .map_err(|e| Auth0Error::ParseError(e.to_string()))
    }

    /// The Google access token stored on the user's federated identity
    ///
    /// Errors with [`Auth0Error::NoGoogleIdentity`] when the user has no
    /// `google-oauth2` identity or it carries no access token (e.g. they
    /// logged in with a non-Google connection).
    pub async fn google_token_for(&self, user_id: &str) -> Result<String, Auth0Error> {
        let profile = self.user_profile(user_id).await?;

        match profile.google_access_token() {
            Some(token) => {
                debug!(
                    user_id = %user_id,
                    token_len = token.len(),
                    "Found Google identity with stored access token"
                );
                Ok(token.to_string())
            }
            None => Err(Auth0Error::NoGoogleIdentity),
        }
    }
}
