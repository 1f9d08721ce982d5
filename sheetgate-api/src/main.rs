//! sheetgate-api - Main entry point
//!
//! Subscription-gated content backend: verifies Auth0-issued access tokens,
//! swaps them for the user's stored Google credential via the management
//! API, and checks YouTube channel subscription.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetgate_api::auth::TokenVerifier;
use sheetgate_api::services::{Auth0Client, YouTubeClient};
use sheetgate_api::{build_router, AppState};
use sheetgate_common::Settings;

/// Command-line arguments for sheetgate-api
#[derive(Parser, Debug)]
#[command(name = "sheetgate-api")]
#[command(about = "Subscription-gated sheet music backend")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "sheetgate.toml", env = "SHEETGATE_CONFIG")]
    config: PathBuf,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "SHEETGATE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetgate_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting sheetgate-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut settings = Settings::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(port) = args.port {
        settings.port = port;
    }

    info!("Auth0 tenant: {}", settings.auth0_domain);
    info!("Gating on channel: {}", settings.channel_id);

    let verifier = TokenVerifier::new(
        settings.jwks_url(),
        settings.issuer(),
        settings.audience(),
    );

    let auth0 = Auth0Client::new(
        settings.token_url(),
        settings.management_api_base(),
        settings.m2m_client_id.clone(),
        settings.m2m_client_secret.clone(),
    )
    .context("Failed to create Auth0 client")?;

    let youtube = YouTubeClient::new().context("Failed to create YouTube client")?;

    let state = AppState {
        verifier: Arc::new(verifier),
        auth0: Arc::new(auth0),
        youtube: Arc::new(youtube),
        channel_id: settings.channel_id.clone(),
        allowed_origin: settings.allowed_origin.clone(),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("sheetgate-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
