//! Outbound API clients

pub mod auth0_client;
pub mod youtube_client;

pub use auth0_client::Auth0Client;
pub use youtube_client::YouTubeClient;
