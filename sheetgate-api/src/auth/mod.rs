//! Inbound bearer-token validation
//!
//! Access tokens are RS256 JWTs issued by the Auth0 tenant. Validation
//! checks signature (against the tenant JWKS), issuer, audience, and
//! expiry. Handlers read the verified claims from a request extension.

mod claims;
mod jwks;
mod middleware;

pub use claims::Claims;
pub use jwks::JwksCache;
pub use middleware::{auth_middleware, AuthError};

use jsonwebtoken::{Algorithm, Validation};
use thiserror::Error;

/// Token verification failures, ordered roughly by how far the token got
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token has no key id")]
    MissingKeyId,

    #[error("no matching key found to validate JWT")]
    UnknownKeyId,

    #[error("failed to fetch JWKS: {0}")]
    JwksFetch(String),

    #[error("token rejected: {0}")]
    Rejected(String),
}

/// Verifies inbound access tokens against the tenant JWKS
pub struct TokenVerifier {
    jwks: JwksCache,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier for the given JWKS URL, issuer, and audience
    pub fn new(jwks_url: String, issuer: String, audience: String) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);

        Self {
            jwks: JwksCache::new(jwks_url),
            validation,
        }
    }

    /// Verify a compact JWT and return its claims
    ///
    /// Fetches the JWKS lazily; an unknown `kid` triggers one refresh
    /// before the token is rejected (handles tenant key rotation).
    pub async fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| VerifyError::Malformed(e.to_string()))?;
        let kid = header.kid.ok_or(VerifyError::MissingKeyId)?;

        let key = self.jwks.key_for(&kid).await?;

        let data = jsonwebtoken::decode::<Claims>(token, &key, &self.validation)
            .map_err(|e| VerifyError::Rejected(e.to_string()))?;

        Ok(data.claims)
    }
}
