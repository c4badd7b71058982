//! A live handle on one stored file.

use crate::registry::AssetRegistry;
use crate::stream::ByteStream;
use crate::traits::AssetBackend;
use assetry_core::{AssetError, AssetMetadata, AssetRecord, AssetResult, AssetType, AssetUpdate};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// An asset record bound to its storage backend and root.
///
/// Content operations resolve the record's relative path against the
/// instance root and delegate to the backend. Assets that carry a thumbnail
/// own a companion asset (see [`Asset::thumb`]) that is created on first use
/// and deleted together with the asset.
pub struct Asset {
    record: AssetRecord,
    root: PathBuf,
    backend: Arc<dyn AssetBackend>,
    registry: AssetRegistry,
    thumb: OnceLock<Box<Asset>>,
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("record", &self.record)
            .field("root", &self.root)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl Asset {
    pub(crate) fn new(
        record: AssetRecord,
        root: PathBuf,
        backend: Arc<dyn AssetBackend>,
        registry: AssetRegistry,
    ) -> Self {
        Self {
            record,
            root,
            backend,
            registry,
            thumb: OnceLock::new(),
        }
    }

    pub fn record(&self) -> &AssetRecord {
        &self.record
    }

    pub fn into_record(self) -> AssetRecord {
        self.record
    }

    /// Effective root (instance override or backend default)
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// Merge `update` into the record and return the new state.
    ///
    /// A root carried by the update replaces the instance root. Changing the
    /// id or path discards the cached thumbnail companion, since its location
    /// is derived from them.
    pub fn set_data(&mut self, mut update: AssetUpdate) -> &AssetRecord {
        if update.id.is_some() || update.path.is_some() {
            self.thumb = OnceLock::new();
        }
        if let Some(root) = update.root.take() {
            self.root = root;
        }
        self.record.apply(update);
        &self.record
    }

    /// Replace the probed technical metadata (see [`AssetRecord::apply_metadata`]).
    pub fn apply_metadata(&mut self, metadata: AssetMetadata) -> &AssetRecord {
        self.record.apply_metadata(metadata);
        &self.record
    }

    /// Resolve `path` against this asset's root.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> AssetResult<PathBuf> {
        self.backend.resolve_path(path.as_ref(), Some(&self.root))
    }

    /// Resolved location of this asset's content.
    pub fn full_path(&self) -> AssetResult<PathBuf> {
        let path = self.record.path.as_deref().ok_or_else(|| {
            AssetError::NotFound(format!(
                "asset {} has no path",
                self.record.id.as_deref().unwrap_or("<unsaved>")
            ))
        })?;
        self.resolve_path(path)
    }

    pub async fn ensure_dir(&self, dir: impl AsRef<Path>) -> AssetResult<()> {
        let dir = self.resolve_path(dir)?;
        self.backend.ensure_dir(&dir).await
    }

    pub async fn ensure_exists(&self) -> AssetResult<()> {
        let path = self.full_path()?;
        self.backend.ensure_exists(&path).await
    }

    /// Open a new stream over this asset's content.
    pub async fn read(&self) -> AssetResult<ByteStream> {
        let path = self.full_path()?;
        self.backend.read(&path).await
    }

    /// Write `input` to `output_path` (relative to this asset's root).
    pub async fn write(&self, input: ByteStream, output_path: impl AsRef<Path>) -> AssetResult<u64> {
        let path = self.resolve_path(output_path)?;
        self.backend.write(input, &path).await
    }

    /// Relocate the content to `new_path` and record the new path.
    pub async fn move_to(&mut self, new_path: &str) -> AssetResult<()> {
        let from = self.full_path()?;
        let to = self.resolve_path(new_path)?;
        self.backend.rename(&from, &to).await?;
        self.set_data(AssetUpdate {
            path: Some(new_path.to_string()),
            ..Default::default()
        });
        Ok(())
    }

    /// Remove the content, deleting the thumbnail first.
    ///
    /// Missing content is not an error, and an asset without a path has
    /// nothing to delete.
    pub async fn delete(&self) -> AssetResult<()> {
        if self.record.path.is_none() {
            return Ok(());
        }
        if self.record.has_thumb {
            self.thumb()?.remove_content().await?;
        }
        self.remove_content().await
    }

    async fn remove_content(&self) -> AssetResult<()> {
        let path = self.full_path()?;
        match self.backend.remove(&path).await {
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %path.display(), "Asset already absent, nothing to delete");
                Ok(())
            }
            result => result,
        }
    }

    /// The thumbnail companion, created on first access.
    ///
    /// Lives in the configured thumbnail directory at
    /// `<id><thumbnail ext>` (or the file stem when the asset has no id) and
    /// never has a thumbnail of its own.
    pub fn thumb(&self) -> AssetResult<&Asset> {
        if let Some(thumb) = self.thumb.get() {
            return Ok(thumb);
        }
        let thumb = self.build_thumb()?;
        Ok(self.thumb.get_or_init(|| Box::new(thumb)))
    }

    fn build_thumb(&self) -> AssetResult<Asset> {
        let stem = self
            .record
            .id
            .clone()
            .or_else(|| self.record.file_stem())
            .ok_or_else(|| {
                AssetError::InvalidParams("asset has neither id nor path for its thumbnail".into())
            })?;
        let ext = self.registry.thumbnail_ext();

        let mut record = AssetRecord::local(format!("{}{}", stem, ext))
            .with_type(AssetType::Image, ext.trim_start_matches('.'));
        record.has_thumb = false;

        self.registry
            .create_asset_in(record, self.registry.thumbnail_dir())
    }
}
