//! Thumbnail and metadata generation for stored assets.

use crate::command::{CommandRunner, ProcessRunner};
use crate::prober::Prober;
use crate::temp::TempCopy;
use crate::transcoder::Transcoder;
use assetry_core::{AssetError, AssetMetadata, AssetResult, AssetType, AssetsConfig};
use assetry_storage::Asset;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThumbOptions {
    /// Recreate the thumbnail even if one already exists
    pub regenerate: bool,
}

impl ThumbOptions {
    pub fn regenerate() -> Self {
        Self { regenerate: true }
    }
}

/// Drives the transcoder and prober against local working copies of
/// asset content.
pub struct MediaToolkit {
    transcoder: Transcoder,
    prober: Prober,
    temp_dir: PathBuf,
}

impl MediaToolkit {
    /// Toolkit that runs the configured binaries as child processes.
    pub fn from_config(config: &AssetsConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner::new(config.tool_timeout)))
    }

    pub fn with_runner(config: &AssetsConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            transcoder: Transcoder::new(&config.ffmpeg_path, config.thumbnail_width, runner.clone()),
            prober: Prober::new(&config.ffprobe_path, runner),
            temp_dir: config.temp_dir.clone(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Create the thumbnail companion's content from `asset`.
    ///
    /// Assets without a thumbnail are left alone. An existing thumbnail is
    /// kept unless `options.regenerate` is set.
    pub async fn generate_thumb(&self, asset: &Asset, options: ThumbOptions) -> AssetResult<()> {
        let record = asset.record();
        if !record.has_thumb {
            tracing::debug!(
                asset_type = %record.asset_type,
                subtype = %record.subtype,
                "Asset has no thumbnail, skipping generation"
            );
            return Ok(());
        }

        let thumb = asset.thumb()?;
        // Written, checked and deleted under this one relative path
        let output = thumb
            .record()
            .path
            .as_deref()
            .map(PathBuf::from)
            .ok_or_else(|| AssetError::InvalidParams("thumbnail has no path".to_string()))?;
        thumb
            .ensure_dir(output.parent().unwrap_or(Path::new("")))
            .await?;

        if !options.regenerate {
            match thumb.ensure_exists().await {
                Ok(()) => {
                    tracing::debug!(
                        thumbnail = ?thumb.record().path,
                        "Thumbnail already exists, skipping generation"
                    );
                    return Ok(());
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }

        // The working copy sits next to the thumbnail so both are addressed
        // relative to the tool's working directory.
        let copy = TempCopy::materialize(asset, thumb.root()).await?;
        let result = self
            .transcoder
            .create_thumbnail(
                copy.file_name(),
                &output,
                record.asset_type == AssetType::Video,
                thumb.root(),
            )
            .await;
        copy.cleanup().await;

        result
    }

    /// Probe `asset` for resolution, duration and size.
    ///
    /// Assets without a thumbnail are not probed and yield empty metadata.
    pub async fn generate_metadata(&self, asset: &Asset) -> AssetResult<AssetMetadata> {
        let record = asset.record();
        if !record.has_thumb {
            return Ok(AssetMetadata::default());
        }

        let copy = TempCopy::materialize(asset, &self.temp_dir).await?;
        let result = self.prober.probe(copy.file_name(), &self.temp_dir).await;
        copy.cleanup().await;

        Ok(result?.to_metadata(record.asset_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{video_probe_json, MockRunner};
    use assetry_core::AssetRecord;
    use assetry_storage::{stream, AssetRegistry};
    use tempfile::{tempdir, TempDir};

    fn config(dir: &TempDir) -> AssetsConfig {
        let mut config = AssetsConfig::new(dir.path().join("assets"));
        config.thumbnail_dir = dir.path().join("thumbs");
        config.temp_dir = dir.path().join("tmp");
        config
    }

    async fn stored(registry: &AssetRegistry, record: AssetRecord) -> Asset {
        let asset = registry.create_asset(record).unwrap();
        let path = asset.record().path.clone().unwrap();
        asset
            .write(stream::from_bytes(b"content".to_vec()), &path)
            .await
            .unwrap();
        asset
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .map(|rd| {
                rd.map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_no_thumb_types_run_nothing() {
        let dir = tempdir().unwrap();
        let config = config(&dir);
        let registry = AssetRegistry::from_config(&config);
        let runner = Arc::new(MockRunner::new());
        let toolkit = MediaToolkit::with_runner(&config, runner.clone());

        for (asset_type, subtype, path) in [
            (AssetType::Audio, "mpeg", "song.mp3"),
            (AssetType::Other, "pdf", "doc.pdf"),
            (AssetType::Image, "svg+xml", "logo.svg"),
        ] {
            let asset = stored(
                &registry,
                AssetRecord::local(path).with_id("x").with_type(asset_type, subtype),
            )
            .await;

            toolkit
                .generate_thumb(&asset, ThumbOptions::regenerate())
                .await
                .unwrap();
            let metadata = toolkit.generate_metadata(&asset).await.unwrap();
            assert!(metadata.is_empty());
        }

        assert_eq!(runner.total_invocations(), 0);
        assert!(!dir.path().join("thumbs").exists());
    }

    #[tokio::test]
    async fn test_existing_thumb_respects_regenerate() {
        let dir = tempdir().unwrap();
        let config = config(&dir);
        let registry = AssetRegistry::from_config(&config);
        let runner = Arc::new(MockRunner::new().writing_output("ffmpeg", "thumbnail"));
        let toolkit = MediaToolkit::with_runner(&config, runner.clone());

        let asset = stored(
            &registry,
            AssetRecord::local("abc.jpg")
                .with_id("abc")
                .with_type(AssetType::Image, "jpeg"),
        )
        .await;
        asset
            .thumb()
            .unwrap()
            .write(stream::from_bytes(b"old".to_vec()), "abc.png")
            .await
            .unwrap();
        let thumb_path = dir.path().join("thumbs/abc.png");

        toolkit
            .generate_thumb(&asset, ThumbOptions::default())
            .await
            .unwrap();
        assert_eq!(runner.invocations("ffmpeg"), 0);
        assert_eq!(std::fs::read(&thumb_path).unwrap(), b"old");

        toolkit
            .generate_thumb(&asset, ThumbOptions::regenerate())
            .await
            .unwrap();
        assert_eq!(runner.invocations("ffmpeg"), 1);
        assert_eq!(std::fs::read(&thumb_path).unwrap(), b"thumbnail");
    }

    #[tokio::test]
    async fn test_first_thumb_creates_thumbnail_dir() {
        let dir = tempdir().unwrap();
        let config = config(&dir);
        let registry = AssetRegistry::from_config(&config);
        let runner = Arc::new(MockRunner::new().writing_output("ffmpeg", "frame"));
        let toolkit = MediaToolkit::with_runner(&config, runner.clone());

        let asset = stored(
            &registry,
            AssetRecord::local("abc.png")
                .with_id("abc")
                .with_type(AssetType::Image, "png"),
        )
        .await;
        assert!(!dir.path().join("thumbs").exists());

        toolkit
            .generate_thumb(&asset, ThumbOptions::default())
            .await
            .unwrap();
        assert_eq!(std::fs::read(dir.path().join("thumbs/abc.png")).unwrap(), b"frame");

        // A second run finds it
        toolkit
            .generate_thumb(&asset, ThumbOptions::default())
            .await
            .unwrap();
        assert_eq!(runner.invocations("ffmpeg"), 1);
    }

    #[tokio::test]
    async fn test_nested_asset_without_id_uses_one_thumb_location() {
        let dir = tempdir().unwrap();
        let config = config(&dir);
        let registry = AssetRegistry::from_config(&config);
        let runner = Arc::new(MockRunner::new().writing_output("ffmpeg", "frame"));
        let toolkit = MediaToolkit::with_runner(&config, runner.clone());

        let asset = stored(
            &registry,
            AssetRecord::local("clips/intro.mp4").with_type(AssetType::Video, "mp4"),
        )
        .await;

        toolkit
            .generate_thumb(&asset, ThumbOptions::default())
            .await
            .unwrap();
        toolkit
            .generate_thumb(&asset, ThumbOptions::default())
            .await
            .unwrap();
        assert_eq!(runner.invocations("ffmpeg"), 1);

        let thumb = asset.thumb().unwrap();
        assert_eq!(thumb.full_path().unwrap(), dir.path().join("thumbs/intro.png"));
        thumb.ensure_exists().await.unwrap();
        assert_eq!(entries(&dir.path().join("thumbs")), vec!["intro.png"]);

        asset.delete().await.unwrap();
        assert!(entries(&dir.path().join("thumbs")).is_empty());
        assert!(!dir.path().join("assets/clips/intro.mp4").exists());
    }

    #[tokio::test]
    async fn test_video_thumb_uses_working_copy() {
        let dir = tempdir().unwrap();
        let config = config(&dir);
        let registry = AssetRegistry::from_config(&config);
        let runner = Arc::new(MockRunner::new().writing_output("ffmpeg", "frame"));
        let toolkit = MediaToolkit::with_runner(&config, runner.clone());

        let asset = stored(
            &registry,
            AssetRecord::local("clip.mp4")
                .with_id("clip")
                .with_type(AssetType::Video, "mp4"),
        )
        .await;

        toolkit
            .generate_thumb(&asset, ThumbOptions::default())
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].input_existed);
        assert_eq!(calls[0].command.cwd, dir.path().join("thumbs"));
        assert!(calls[0].command.args.contains(&"tmp_clip.mp4".to_string()));
        assert!(calls[0].command.args.contains(&"-ss".to_string()));

        // Only the thumbnail is left behind
        assert_eq!(entries(&dir.path().join("thumbs")), vec!["clip.png"]);
    }

    #[tokio::test]
    async fn test_transcoder_failure_still_cleans_up() {
        let dir = tempdir().unwrap();
        let config = config(&dir);
        let registry = AssetRegistry::from_config(&config);
        let runner = Arc::new(MockRunner::new().with_failure("ffmpeg", 1, "Invalid data"));
        let toolkit = MediaToolkit::with_runner(&config, runner);

        let asset = stored(
            &registry,
            AssetRecord::local("bad.png")
                .with_id("bad")
                .with_type(AssetType::Image, "png"),
        )
        .await;

        let err = toolkit
            .generate_thumb(&asset, ThumbOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::TranscoderFailure { .. }));
        assert!(entries(&dir.path().join("thumbs")).is_empty());
    }

    #[tokio::test]
    async fn test_generate_metadata() {
        let dir = tempdir().unwrap();
        let config = config(&dir);
        let registry = AssetRegistry::from_config(&config);
        let runner = Arc::new(
            MockRunner::new().with_stdout("ffprobe", video_probe_json(1920, 1080, "42.7", 9000)),
        );
        let toolkit = MediaToolkit::with_runner(&config, runner.clone());

        let asset = stored(
            &registry,
            AssetRecord::local("movie.mp4")
                .with_id("movie")
                .with_type(AssetType::Video, "mp4"),
        )
        .await;

        let metadata = toolkit.generate_metadata(&asset).await.unwrap();
        assert_eq!(
            metadata,
            AssetMetadata {
                resolution: Some("1920x1080".to_string()),
                duration: Some(42),
                size: Some(9000),
            }
        );

        let calls = runner.calls();
        assert!(calls[0].input_existed);
        assert_eq!(calls[0].command.cwd, dir.path().join("tmp"));
        assert!(entries(&dir.path().join("tmp")).is_empty());
    }

    #[tokio::test]
    async fn test_prober_failure_cleans_up_first() {
        let dir = tempdir().unwrap();
        let config = config(&dir);
        let registry = AssetRegistry::from_config(&config);
        let runner = Arc::new(MockRunner::new().with_failure("ffprobe", 1, "Invalid data"));
        let toolkit = MediaToolkit::with_runner(&config, runner);

        let asset = stored(
            &registry,
            AssetRecord::local("movie.mp4").with_type(AssetType::Video, "mp4"),
        )
        .await;

        let err = toolkit.generate_metadata(&asset).await.unwrap_err();
        match err {
            AssetError::ProberFailure { command, cwd, .. } => {
                assert!(command.contains("tmp_movie.mp4"));
                assert_eq!(cwd, dir.path().join("tmp"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(entries(&dir.path().join("tmp")).is_empty());
    }
}
