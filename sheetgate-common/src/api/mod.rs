//! Shared API types for sheetgate services

pub mod types;
