//! Assetry Storage Library
//!
//! This crate provides the asset storage contract ([`AssetBackend`]), the
//! local filesystem backend, the registry that selects a backend from an
//! asset's `repo` discriminator, and [`Asset`], a live handle on one stored
//! file together with its lazily created thumbnail companion.
//!
//! # Paths
//!
//! Records store paths relative to a root. An asset's root is either its
//! per-instance override or the backend's default root; resolving a
//! relative path against an empty root fails with `InvalidParams`.
//! Absolute paths are used as given.

pub mod asset;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod registry;
pub mod stream;
pub mod traits;

// Re-export commonly used types
pub use asset::Asset;
#[cfg(feature = "storage-local")]
pub use local::LocalBackend;
pub use registry::{AssetRegistry, AssetRegistryBuilder};
pub use stream::ByteStream;
pub use traits::AssetBackend;
