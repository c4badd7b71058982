//! Scoped local working copies of asset content.

use assetry_core::constants::TEMP_FILE_PREFIX;
use assetry_core::{AssetError, AssetRecord, AssetResult};
use assetry_storage::Asset;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A copy of an asset's content at `<dir>/<prefix><filename>`, removed when
/// the guard goes out of scope.
///
/// Prefer [`TempCopy::cleanup`] on the normal path so removal is awaited and
/// failures are logged; `Drop` is the fallback for early returns.
#[derive(Debug)]
pub struct TempCopy {
    path: PathBuf,
    armed: bool,
}

impl TempCopy {
    /// Stream `asset` into a new temp file under `dir`.
    pub async fn materialize(asset: &Asset, dir: &Path) -> AssetResult<Self> {
        let filename = asset.record().filename().ok_or_else(|| {
            AssetError::InvalidParams("asset has no path to copy from".to_string())
        })?;
        let name = format!("{}{}", TEMP_FILE_PREFIX, filename);

        let target = asset
            .registry()
            .create_asset_in(AssetRecord::local(name.as_str()), dir)?;
        let guard = Self {
            path: target.full_path()?,
            armed: true,
        };

        let input = asset.read().await?;
        target.write(input, &name).await?;

        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the copy within its directory.
    pub fn file_name(&self) -> &Path {
        self.path
            .file_name()
            .map(Path::new)
            .unwrap_or(&self.path)
    }

    /// Remove the file now. A file that is already gone is fine.
    pub async fn cleanup(mut self) {
        self.armed = false;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove temp file"
                );
            }
        }
    }
}

impl Drop for TempCopy {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
