//! Tenant JWKS fetching and caching
//!
//! The key set is fetched lazily on first use and kept in process. A token
//! carrying an unknown `kid` forces one refetch before being rejected, which
//! covers tenant signing-key rotation without a background refresh task.

use super::VerifyError;
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON Web Key Set document
#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

/// A single key; only RSA signing keys are usable here
#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
    #[serde(default, rename = "use")]
    key_use: Option<String>,
}

/// In-process cache of the tenant's verification keys, indexed by `kid`
pub struct JwksCache {
    http_client: reqwest::Client,
    jwks_url: String,
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl JwksCache {
    pub fn new(jwks_url: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            jwks_url,
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the decoding key for `kid`, refreshing the set once on a miss
    pub async fn key_for(&self, kid: &str) -> Result<DecodingKey, VerifyError> {
        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(key.clone());
        }

        debug!(kid = %kid, "Key id not cached, refreshing JWKS");
        self.refresh().await?;

        self.keys
            .read()
            .await
            .get(kid)
            .cloned()
            .ok_or(VerifyError::UnknownKeyId)
    }

    /// Fetch the JWKS and replace the cached key map
    async fn refresh(&self) -> Result<(), VerifyError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| VerifyError::JwksFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::JwksFetch(format!(
                "JWKS endpoint returned {}",
                status
            )));
        }

        let set: JwkSet = response
            .json()
            .await
            .map_err(|e| VerifyError::JwksFetch(e.to_string()))?;

        let mut map = HashMap::new();
        for jwk in &set.keys {
            if jwk.kty != "RSA" {
                continue;
            }
            if matches!(jwk.key_use.as_deref(), Some(u) if u != "sig") {
                continue;
            }
            let (Some(kid), Some(n), Some(e)) = (&jwk.kid, &jwk.n, &jwk.e) else {
                continue;
            };
            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => {
                    map.insert(kid.clone(), key);
                }
                Err(err) => {
                    warn!(kid = %kid, "Skipping unusable JWK: {}", err);
                }
            }
        }

        info!(url = %self.jwks_url, keys = map.len(), "JWKS refreshed");

        *self.keys.write().await = map;
        Ok(())
    }
}
