//! Configuration loading and validation
//!
//! Settings are resolved in priority order:
//! 1. Environment variables (`SHEETGATE_*`)
//! 2. TOML config file (path supplied by the caller, usually via CLI)
//! 3. Compiled defaults
//!
//! Secrets (the M2M client secret) should come from the environment in
//! production; the TOML file is accepted for local development.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default port matches the original deployment.
pub const DEFAULT_PORT: u16 = 4000;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Auth0 tenant domain, e.g. `dev-xyz.us.auth0.com` (no scheme)
    pub auth0_domain: String,

    /// Expected `aud` claim on inbound access tokens.
    /// Defaults to the tenant's management API audience.
    #[serde(default)]
    pub api_audience: Option<String>,

    /// Machine-to-machine application credentials for the management API
    pub m2m_client_id: String,
    #[serde(default)]
    pub m2m_client_secret: String,

    /// YouTube channel whose subscribers get access
    pub channel_id: String,

    /// HTTP listen host/port
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin allowed to call this API from a browser
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_allowed_origin() -> String {
    DEFAULT_ALLOWED_ORIGIN.to_string()
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(text).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        Ok(settings)
    }

    /// Load settings from a TOML file, then apply environment overrides
    /// and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        let mut settings = Self::from_toml_str(&text)?;
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Override individual settings from `SHEETGATE_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SHEETGATE_AUTH0_DOMAIN") {
            self.auth0_domain = v;
        }
        if let Ok(v) = std::env::var("SHEETGATE_API_AUDIENCE") {
            self.api_audience = Some(v);
        }
        if let Ok(v) = std::env::var("SHEETGATE_M2M_CLIENT_ID") {
            self.m2m_client_id = v;
        }
        if let Ok(v) = std::env::var("SHEETGATE_M2M_CLIENT_SECRET") {
            self.m2m_client_secret = v;
        }
        if let Ok(v) = std::env::var("SHEETGATE_CHANNEL_ID") {
            self.channel_id = v;
        }
        if let Ok(v) = std::env::var("SHEETGATE_HOST") {
            self.host = v;
        }
        if let Ok(v) = std::env::var("SHEETGATE_PORT") {
            if let Ok(port) = v.parse() {
                self.port = port;
            }
        }
        if let Ok(v) = std::env::var("SHEETGATE_ALLOWED_ORIGIN") {
            self.allowed_origin = v;
        }
    }

    /// Validate that all required settings are present and well-formed
    pub fn validate(&self) -> Result<()> {
        if self.auth0_domain.is_empty() {
            return Err(Error::Config("auth0_domain is required".to_string()));
        }
        if self.auth0_domain.contains("://") {
            return Err(Error::Config(
                "auth0_domain must be a bare domain (no scheme)".to_string(),
            ));
        }
        if self.m2m_client_id.is_empty() {
            return Err(Error::Config("m2m_client_id is required".to_string()));
        }
        if self.m2m_client_secret.is_empty() {
            return Err(Error::Config(
                "m2m_client_secret is required (set SHEETGATE_M2M_CLIENT_SECRET)".to_string(),
            ));
        }
        if self.channel_id.is_empty() {
            return Err(Error::Config("channel_id is required".to_string()));
        }
        // Must be usable as an HTTP header value verbatim (CORS allow-origin)
        if self.allowed_origin.is_empty()
            || !self.allowed_origin.chars().all(|c| c.is_ascii_graphic())
        {
            return Err(Error::Config(
                "allowed_origin must be a visible-ASCII origin (no spaces or control characters)"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Token issuer expected on inbound tokens (trailing slash per Auth0)
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.auth0_domain)
    }

    /// Expected audience of inbound access tokens
    pub fn audience(&self) -> String {
        match &self.api_audience {
            Some(aud) => aud.clone(),
            None => format!("https://{}/api/v2/", self.auth0_domain),
        }
    }

    /// JWKS location for the tenant
    pub fn jwks_url(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.auth0_domain)
    }

    /// Management API base URL for the tenant
    pub fn management_api_base(&self) -> String {
        format!("https://{}/api/v2", self.auth0_domain)
    }

    /// OAuth token endpoint for the tenant
    pub fn token_url(&self) -> String {
        format!("https://{}/oauth/token", self.auth0_domain)
    }
}
