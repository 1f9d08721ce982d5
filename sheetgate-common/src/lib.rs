//! # Sheetgate Common Library
//!
//! Shared code for the sheetgate services including:
//! - API request/response types
//! - Configuration loading and validation
//! - Common error types

pub mod api;
pub mod config;
pub mod error;

pub use config::Settings;
pub use error::{Error, Result};
