//! Single-frame thumbnail extraction with ffmpeg.

use crate::command::{CommandRunner, ToolCommand};
use assetry_core::constants::VIDEO_THUMB_SEEK;
use assetry_core::{AssetError, AssetResult};
use std::path::Path;
use std::sync::Arc;

pub struct Transcoder {
    ffmpeg_path: String,
    max_width: u32,
    runner: Arc<dyn CommandRunner>,
}

impl Transcoder {
    pub fn new(ffmpeg_path: impl Into<String>, max_width: u32, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            max_width,
            runner,
        }
    }

    /// ffmpeg invocation that scales the first frame (5s in, for video) of
    /// `input` to the configured width and writes it to `output`.
    pub fn thumbnail_command(&self, input: &Path, output: &Path, is_video: bool, cwd: &Path) -> ToolCommand {
        let mut command = ToolCommand::new(&self.ffmpeg_path, cwd)
            .arg("-i")
            .path_arg(input)
            .arg("-vf")
            .arg(format!("scale={}:-1", self.max_width))
            .arg("-vframes")
            .arg("1")
            .arg("-update")
            .arg("1");
        if is_video {
            command = command.arg("-ss").arg(VIDEO_THUMB_SEEK);
        }
        command
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .path_arg(output)
    }

    pub async fn create_thumbnail(&self, input: &Path, output: &Path, is_video: bool, cwd: &Path) -> AssetResult<()> {
        let start = std::time::Instant::now();
        let command = self.thumbnail_command(input, output, is_video, cwd);

        command
            .execute(self.runner.as_ref())
            .await
            .map_err(|e| AssetError::TranscoderFailure {
                command: command.command_line(),
                cwd: command.cwd.clone(),
                message: e.to_string(),
            })?;

        tracing::info!(
            output = %output.display(),
            duration_ms = start.elapsed().as_millis(),
            "Thumbnail created"
        );

        Ok(())
    }
}
