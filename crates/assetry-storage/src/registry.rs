#[cfg(feature = "storage-local")]
use crate::LocalBackend;
use crate::{Asset, AssetBackend};
use assetry_core::{AssetError, AssetRecord, AssetResult, AssetsConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Backends keyed by their `repo` discriminator, plus the thumbnail
/// settings every asset needs to build its companion.
///
/// Cheap to clone; assets keep a handle so they can create their thumbnail.
#[derive(Clone)]
pub struct AssetRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    backends: HashMap<String, Arc<dyn AssetBackend>>,
    thumbnail_dir: PathBuf,
    thumbnail_ext: String,
}

pub struct AssetRegistryBuilder {
    backends: HashMap<String, Arc<dyn AssetBackend>>,
    thumbnail_dir: PathBuf,
    thumbnail_ext: String,
}

impl AssetRegistryBuilder {
    /// Register `backend` under its name, replacing any previous one.
    pub fn backend(mut self, backend: Arc<dyn AssetBackend>) -> Self {
        self.backends.insert(backend.name().to_string(), backend);
        self
    }

    pub fn build(self) -> AssetRegistry {
        AssetRegistry {
            inner: Arc::new(RegistryInner {
                backends: self.backends,
                thumbnail_dir: self.thumbnail_dir,
                thumbnail_ext: self.thumbnail_ext,
            }),
        }
    }
}

impl AssetRegistry {
    pub fn builder(
        thumbnail_dir: impl Into<PathBuf>,
        thumbnail_ext: impl Into<String>,
    ) -> AssetRegistryBuilder {
        AssetRegistryBuilder {
            backends: HashMap::new(),
            thumbnail_dir: thumbnail_dir.into(),
            thumbnail_ext: thumbnail_ext.into(),
        }
    }

    /// Registry with every backend enabled in this build, configured from `config`.
    pub fn from_config(config: &AssetsConfig) -> Self {
        let builder = Self::builder(&config.thumbnail_dir, &config.thumbnail_ext);

        #[cfg(feature = "storage-local")]
        let builder = builder.backend(Arc::new(LocalBackend::new(&config.asset_dir)));

        builder.build()
    }

    pub fn backend(&self, repo: &str) -> AssetResult<Arc<dyn AssetBackend>> {
        self.inner.backends.get(repo).cloned().ok_or_else(|| {
            AssetError::InvalidConfig(format!("no storage backend registered for '{}'", repo))
        })
    }

    pub fn thumbnail_dir(&self) -> &Path {
        &self.inner.thumbnail_dir
    }

    pub fn thumbnail_ext(&self) -> &str {
        &self.inner.thumbnail_ext
    }

    /// Create an asset for `record`, rooted at its backend's default root.
    pub fn create_asset(&self, record: AssetRecord) -> AssetResult<Asset> {
        let backend = self.backend(&record.repo)?;
        let root = backend.asset_root()?.to_path_buf();
        Ok(Asset::new(record, root, backend, self.clone()))
    }

    /// Create an asset for `record` with an explicit root.
    pub fn create_asset_in(&self, record: AssetRecord, root: impl Into<PathBuf>) -> AssetResult<Asset> {
        let backend = self.backend(&record.repo)?;
        Ok(Asset::new(record, root.into(), backend, self.clone()))
    }
}
