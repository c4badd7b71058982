//! Assetry Core Library
//!
//! This crate provides the asset data model, error types and configuration
//! shared by the storage backends, the media toolkit and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::AssetsConfig;
pub use error::{AssetError, AssetResult, ErrorMetadata, LogLevel};
pub use models::{AssetMetadata, AssetRecord, AssetType, AssetUpdate};
