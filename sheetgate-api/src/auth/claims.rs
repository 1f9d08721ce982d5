//! Verified access-token claims

use serde::Deserialize;

/// Claims extracted from a verified access token
///
/// `sub` is optional at this layer: a token can verify fine while carrying
/// an unusable claim set, and that case maps to 400 rather than 401.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Subject: the identity-platform user id, e.g. `google-oauth2|1234`
    #[serde(default)]
    pub sub: Option<String>,

    /// Expiry (seconds since epoch); checked during verification
    #[serde(default)]
    pub exp: Option<u64>,

    /// Granted scopes, space-separated
    #[serde(default)]
    pub scope: Option<String>,
}
