//! Asset storage contract
//!
//! This module defines the capability set every storage backend must
//! implement. Backends operate on already-resolved locations; the
//! per-instance bookkeeping (root override, record path, thumbnail cascade)
//! lives in [`crate::Asset`].

use crate::stream::ByteStream;
use assetry_core::{AssetError, AssetResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Storage backend trait
///
/// Registered in an [`crate::AssetRegistry`] under [`AssetBackend::name`],
/// which is the value stored in `AssetRecord::repo`.
#[async_trait]
pub trait AssetBackend: Send + Sync {
    /// Backend discriminator (e.g. "local")
    fn name(&self) -> &'static str;

    /// Default root for assets of this backend.
    ///
    /// Backends without a default root leave this unimplemented; their
    /// assets must then be created with an explicit root.
    fn asset_root(&self) -> AssetResult<&Path> {
        Err(AssetError::FunctionNotOverridden(format!(
            "{}#asset_root",
            self.name()
        )))
    }

    /// Resolve `path` against `base`.
    ///
    /// Fails with `InvalidParams` when `base` is missing or empty; absolute
    /// paths pass through unchanged.
    fn resolve_path(&self, path: &Path, base: Option<&Path>) -> AssetResult<PathBuf>;

    /// Create `dir` and its parents; an existing directory is not an error.
    async fn ensure_dir(&self, dir: &Path) -> AssetResult<()>;

    /// Fail with `NotFound` when nothing is stored at `path`.
    async fn ensure_exists(&self, path: &Path) -> AssetResult<()>;

    /// Open a fresh stream over the content stored at `path`.
    async fn read(&self, path: &Path) -> AssetResult<ByteStream>;

    /// Persist `input` at `path`, replacing any existing content, and return
    /// the number of bytes written. Only returns once the data is flushed.
    async fn write(&self, input: ByteStream, path: &Path) -> AssetResult<u64>;

    /// Move the content at `from` to `to`.
    async fn rename(&self, from: &Path, to: &Path) -> AssetResult<()>;

    /// Remove the content at `path`; fails with `NotFound` when absent.
    async fn remove(&self, path: &Path) -> AssetResult<()>;
}
