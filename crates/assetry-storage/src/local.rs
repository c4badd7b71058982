use crate::stream::{self, ByteStream};
use crate::traits::AssetBackend;
use assetry_core::constants::LOCAL_REPO;
use assetry_core::{AssetError, AssetResult};
use async_trait::async_trait;
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalBackend {
    asset_root: PathBuf,
}

impl LocalBackend {
    /// Create a new LocalBackend
    ///
    /// # Arguments
    /// * `asset_root` - Default root directory for assets (e.g., "/var/lib/assetry/assets")
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }
}

fn map_not_found(err: std::io::Error, path: &Path) -> AssetError {
    if err.kind() == ErrorKind::NotFound {
        AssetError::not_found(path)
    } else {
        AssetError::Io(err)
    }
}

#[async_trait]
impl AssetBackend for LocalBackend {
    fn name(&self) -> &'static str {
        LOCAL_REPO
    }

    fn asset_root(&self) -> AssetResult<&Path> {
        Ok(&self.asset_root)
    }

    fn resolve_path(&self, path: &Path, base: Option<&Path>) -> AssetResult<PathBuf> {
        let base = base
            .filter(|b| !b.as_os_str().is_empty())
            .ok_or_else(|| {
                AssetError::InvalidParams(format!(
                    "no root to resolve '{}' against",
                    path.display()
                ))
            })?;

        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }

        // Relative keys must stay below their root
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(AssetError::InvalidParams(format!(
                "path '{}' escapes its root",
                path.display()
            )));
        }

        // "" and "." name the root itself
        let relative: PathBuf = path
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        if relative.as_os_str().is_empty() {
            return Ok(base.to_path_buf());
        }

        Ok(base.join(relative))
    }

    async fn ensure_dir(&self, dir: &Path) -> AssetResult<()> {
        match fs::create_dir_all(dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_exists(&self, path: &Path) -> AssetResult<()> {
        fs::metadata(path)
            .await
            .map(|_| ())
            .map_err(|e| map_not_found(e, path))
    }

    async fn read(&self, path: &Path) -> AssetResult<ByteStream> {
        self.ensure_exists(path).await?;
        let file = fs::File::open(path)
            .await
            .map_err(|e| map_not_found(e, path))?;
        Ok(stream::from_reader(file))
    }

    async fn write(&self, mut input: ByteStream, path: &Path) -> AssetResult<u64> {
        let start = std::time::Instant::now();

        if let Some(parent) = path.parent() {
            self.ensure_dir(parent).await?;
        }

        let mut file = fs::File::create(path).await?;
        let mut bytes_written = 0u64;
        while let Some(chunk) = input.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        tracing::info!(
            path = %path.display(),
            size_bytes = bytes_written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local asset write successful"
        );

        Ok(bytes_written)
    }

    async fn rename(&self, from: &Path, to: &Path) -> AssetResult<()> {
        self.ensure_exists(from).await?;
        if let Some(parent) = to.parent() {
            self.ensure_dir(parent).await?;
        }
        fs::rename(from, to)
            .await
            .map_err(|e| map_not_found(e, from))?;

        tracing::info!(
            from_path = %from.display(),
            to_path = %to.display(),
            "Local asset move successful"
        );

        Ok(())
    }

    async fn remove(&self, path: &Path) -> AssetResult<()> {
        self.ensure_exists(path).await?;
        fs::remove_file(path)
            .await
            .map_err(|e| map_not_found(e, path))?;

        tracing::info!(path = %path.display(), "Local asset delete successful");

        Ok(())
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_path() {
        let backend = LocalBackend::new("/data/assets");
        let base = Path::new("/data/assets");

        assert_eq!(
            backend.resolve_path(Path::new("abc.png"), Some(base)).unwrap(),
            PathBuf::from("/data/assets/abc.png")
        );
        assert_eq!(
            backend
                .resolve_path(Path::new("/elsewhere/abc.png"), Some(base))
                .unwrap(),
            PathBuf::from("/elsewhere/abc.png")
        );
    }

    #[test]
    fn test_resolve_path_requires_root() {
        let backend = LocalBackend::new("");

        for input in ["abc.png", "/absolute/abc.png"] {
            let result = backend.resolve_path(Path::new(input), Some(Path::new("")));
            assert!(matches!(result, Err(AssetError::InvalidParams(_))));
            let result = backend.resolve_path(Path::new(input), None);
            assert!(matches!(result, Err(AssetError::InvalidParams(_))));
        }
    }

    #[test]
    fn test_resolve_root_itself() {
        let backend = LocalBackend::new("/data/assets");
        let base = Path::new("/data/thumbs");

        for input in ["", ".", "./"] {
            assert_eq!(
                backend.resolve_path(Path::new(input), Some(base)).unwrap(),
                PathBuf::from("/data/thumbs")
            );
        }
        assert_eq!(
            backend.resolve_path(Path::new("./a/./b.png"), Some(base)).unwrap(),
            PathBuf::from("/data/thumbs/a/b.png")
        );
    }

    #[tokio::test]
    async fn test_ensure_dir_on_resolved_root() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());
        let root = dir.path().join("fresh/thumbs");

        let resolved = backend.resolve_path(Path::new("."), Some(&root)).unwrap();
        backend.ensure_dir(&resolved).await.unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_path_traversal_rejected() {
        let backend = LocalBackend::new("/data/assets");
        let result = backend.resolve_path(Path::new("../../etc/passwd"), Some(Path::new("/data")));
        assert!(matches!(result, Err(AssetError::InvalidParams(_))));
    }

    #[test]
    fn test_asset_root() {
        let backend = LocalBackend::new("/data/assets");
        assert_eq!(backend.asset_root().unwrap(), Path::new("/data/assets"));
        assert_eq!(backend.name(), "local");
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());
        let nested = dir.path().join("a/b/c");

        backend.ensure_dir(&nested).await.unwrap();
        backend.ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_exists_not_found() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());

        let result = backend.ensure_exists(&dir.path().join("missing.png")).await;
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());
        let path = dir.path().join("nested/dir/file.txt");

        let written = backend
            .write(stream::from_bytes(b"first version".to_vec()), &path)
            .await
            .unwrap();
        assert_eq!(written, 13);

        backend
            .write(stream::from_bytes(b"second".to_vec()), &path)
            .await
            .unwrap();

        let data = stream::collect(backend.read(&path).await.unwrap())
            .await
            .unwrap();
        assert_eq!(data, b"second");

        // Every read starts from the beginning
        let again = stream::collect(backend.read(&path).await.unwrap())
            .await
            .unwrap();
        assert_eq!(again, b"second");
    }

    #[tokio::test]
    async fn test_write_propagates_stream_errors() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());
        let input: ByteStream = Box::pin(futures::stream::iter(vec![
            Ok(bytes::Bytes::from_static(b"partial")),
            Err(std::io::Error::new(ErrorKind::BrokenPipe, "upload aborted")),
        ]));

        let result = backend.write(input, &dir.path().join("broken.bin")).await;
        assert!(matches!(result, Err(AssetError::Io(ref e)) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[tokio::test]
    async fn test_read_missing() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());

        let result = backend.read(&dir.path().join("missing.bin")).await;
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rename() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());
        let from = dir.path().join("from.txt");
        let to = dir.path().join("moved/to.txt");

        backend
            .write(stream::from_bytes(b"content".to_vec()), &from)
            .await
            .unwrap();
        backend.rename(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(std::fs::read(&to).unwrap(), b"content");

        let result = backend.rename(&from, &to).await;
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());
        let path = dir.path().join("gone.txt");

        backend
            .write(stream::from_bytes(b"x".to_vec()), &path)
            .await
            .unwrap();
        backend.remove(&path).await.unwrap();
        assert!(!path.exists());

        let result = backend.remove(&path).await;
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }
}
