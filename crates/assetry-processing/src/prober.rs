//! Technical metadata extraction with ffprobe.

use crate::command::{CommandRunner, ToolCommand, ToolError};
use assetry_core::{AssetError, AssetMetadata, AssetResult, AssetType};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// The parts of an ffprobe JSON report that are used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub format: ProbeFormat,
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeFormat {
    pub size: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeStream {
    pub codec_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: Option<String>,
}

fn parse_seconds(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(|d| d.floor() as u64)
}

impl ProbeReport {
    pub fn parse(stdout: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(stdout)
    }

    pub fn video_stream(&self) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
    }

    /// Metadata for an asset of `asset_type` described by this report.
    pub fn to_metadata(&self, asset_type: AssetType) -> AssetMetadata {
        let stream = self.video_stream();

        let resolution = stream.and_then(|s| match (s.width, s.height) {
            (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
            _ => None,
        });

        // WebM and friends only carry the duration on the container
        let duration = if asset_type == AssetType::Video {
            parse_seconds(stream.and_then(|s| s.duration.as_deref()))
                .or_else(|| parse_seconds(self.format.duration.as_deref()))
        } else {
            None
        };

        let size = self
            .format
            .size
            .as_deref()
            .and_then(|s| s.trim().parse::<u64>().ok());

        AssetMetadata {
            resolution,
            duration,
            size,
        }
    }
}

pub struct Prober {
    ffprobe_path: String,
    runner: Arc<dyn CommandRunner>,
}

impl Prober {
    pub fn new(ffprobe_path: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            runner,
        }
    }

    pub fn probe_command(&self, input: &Path, cwd: &Path) -> ToolCommand {
        ToolCommand::new(&self.ffprobe_path, cwd)
            .arg("-i")
            .path_arg(input)
            .args(["-loglevel", "error", "-print_format", "json", "-show_format", "-show_streams"])
    }

    pub async fn probe(&self, input: &Path, cwd: &Path) -> AssetResult<ProbeReport> {
        let start = std::time::Instant::now();
        let command = self.probe_command(input, cwd);
        let failure = |e: ToolError| AssetError::ProberFailure {
            command: command.command_line(),
            cwd: command.cwd.clone(),
            message: e.to_string(),
        };

        let output = command.execute(self.runner.as_ref()).await.map_err(failure)?;
        let report = ProbeReport::parse(&output.stdout)
            .map_err(|e| failure(ToolError::Output(e.to_string())))?;

        tracing::info!(
            input = %input.display(),
            streams = report.streams.len(),
            duration_ms = start.elapsed().as_millis(),
            "Probe completed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{image_probe_json, video_probe_json, MockRunner};

    #[test]
    fn test_video_metadata() {
        let report = ProbeReport::parse(video_probe_json(1920, 1080, "42.7", 5_242_880).as_bytes()).unwrap();
        let metadata = report.to_metadata(AssetType::Video);

        assert_eq!(metadata.resolution.as_deref(), Some("1920x1080"));
        assert_eq!(metadata.duration, Some(42));
        assert_eq!(metadata.size, Some(5_242_880));
    }

    #[test]
    fn test_image_metadata_has_no_duration() {
        let report = ProbeReport::parse(image_probe_json(640, 480, 2048).as_bytes()).unwrap();
        let metadata = report.to_metadata(AssetType::Image);

        assert_eq!(metadata.resolution.as_deref(), Some("640x480"));
        assert_eq!(metadata.duration, None);
        assert_eq!(metadata.size, Some(2048));
    }

    #[test]
    fn test_duration_falls_back_to_container() {
        let json = r#"{
            "streams": [{ "codec_type": "video", "width": 1280, "height": 720 }],
            "format": { "duration": "12.04", "size": "100" }
        }"#;
        let metadata = ProbeReport::parse(json.as_bytes())
            .unwrap()
            .to_metadata(AssetType::Video);

        assert_eq!(metadata.duration, Some(12));
    }

    #[test]
    fn test_partial_dimensions_omit_resolution() {
        let json = r#"{
            "streams": [
                { "codec_type": "audio" },
                { "codec_type": "video", "width": 1280 }
            ],
            "format": {}
        }"#;
        let metadata = ProbeReport::parse(json.as_bytes())
            .unwrap()
            .to_metadata(AssetType::Video);

        assert_eq!(metadata.resolution, None);
        assert_eq!(metadata.duration, None);
        assert_eq!(metadata.size, None);
    }

    #[test]
    fn test_probe_command() {
        let prober = Prober::new("ffprobe", Arc::new(MockRunner::new()));
        let command = prober.probe_command(Path::new("/tmp/tmp_a.mp4"), Path::new("/tmp"));
        assert_eq!(
            command.command_line(),
            "ffprobe -i /tmp/tmp_a.mp4 -loglevel error -print_format json -show_format -show_streams"
        );
    }

    #[tokio::test]
    async fn test_unparseable_output() {
        let runner = Arc::new(MockRunner::new().with_stdout("ffprobe", "not json"));
        let prober = Prober::new("ffprobe", runner);

        let err = prober
            .probe(Path::new("a.mp4"), Path::new("/tmp"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::ProberFailure { .. }));
    }
}
