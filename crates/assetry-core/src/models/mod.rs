//! Data models for assets and their derived metadata

mod asset;

pub use asset::*;
