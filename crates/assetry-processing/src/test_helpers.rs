//! Test helpers
//!
//! [`MockRunner`] stands in for ffmpeg/ffprobe: it records every invocation
//! and answers with configured output, so generation logic can be tested
//! without the real binaries installed.

use crate::command::{CommandRunner, ToolCommand, ToolError, ToolOutput};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Response {
    Stdout(Vec<u8>),
    Failure { code: i32, stderr: String },
    /// Write `content` to the last argument (the tool's output path)
    WriteOutput(Vec<u8>),
}

/// A recorded invocation
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub command: ToolCommand,
    /// Whether the file following `-i` existed when the tool was started
    pub input_existed: bool,
}

/// Recording [`CommandRunner`] keyed by program name.
///
/// Programs without a configured response succeed with empty output.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: HashMap<String, Response>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdout(mut self, program: &str, stdout: impl Into<Vec<u8>>) -> Self {
        self.responses
            .insert(program.to_string(), Response::Stdout(stdout.into()));
        self
    }

    pub fn with_failure(mut self, program: &str, code: i32, stderr: &str) -> Self {
        self.responses.insert(
            program.to_string(),
            Response::Failure {
                code,
                stderr: stderr.to_string(),
            },
        );
        self
    }

    pub fn writing_output(mut self, program: &str, content: impl Into<Vec<u8>>) -> Self {
        self.responses
            .insert(program.to_string(), Response::WriteOutput(content.into()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn invocations(&self, program: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.command.program == program)
            .count()
    }

    pub fn total_invocations(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

fn resolve(command: &ToolCommand, arg: &str) -> PathBuf {
    let path = PathBuf::from(arg);
    if path.is_absolute() {
        path
    } else {
        command.cwd.join(path)
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput, ToolError> {
        let input_existed = command
            .args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| command.args.get(i + 1))
            .map(|input| resolve(command, input).exists())
            .unwrap_or(false);

        self.calls.lock().unwrap().push(RecordedCall {
            command: command.clone(),
            input_existed,
        });

        match self.responses.get(&command.program) {
            None => Ok(ToolOutput {
                success: true,
                code: Some(0),
                ..Default::default()
            }),
            Some(Response::Stdout(stdout)) => Ok(ToolOutput {
                success: true,
                code: Some(0),
                stdout: stdout.clone(),
                stderr: Vec::new(),
            }),
            Some(Response::Failure { code, stderr }) => Ok(ToolOutput {
                success: false,
                code: Some(*code),
                stdout: Vec::new(),
                stderr: stderr.clone().into_bytes(),
            }),
            Some(Response::WriteOutput(content)) => {
                let output = command
                    .args
                    .last()
                    .map(|a| resolve(command, a))
                    .ok_or_else(|| ToolError::Output("no output path".to_string()))?;
                tokio::fs::write(&output, content)
                    .await
                    .map_err(ToolError::Spawn)?;
                Ok(ToolOutput {
                    success: true,
                    code: Some(0),
                    ..Default::default()
                })
            }
        }
    }
}

/// ffprobe report for a single video stream.
pub fn video_probe_json(width: u32, height: u32, duration: &str, size: u64) -> String {
    format!(
        r#"{{
  "streams": [
    {{ "index": 0, "codec_type": "audio", "codec_name": "aac", "duration": "{duration}" }},
    {{ "index": 1, "codec_type": "video", "codec_name": "h264", "width": {width}, "height": {height}, "duration": "{duration}" }}
  ],
  "format": {{ "format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "{duration}", "size": "{size}" }}
}}"#
    )
}

/// ffprobe report for a still image.
pub fn image_probe_json(width: u32, height: u32, size: u64) -> String {
    format!(
        r#"{{
  "streams": [
    {{ "index": 0, "codec_type": "video", "codec_name": "png", "width": {width}, "height": {height} }}
  ],
  "format": {{ "format_name": "png_pipe", "size": "{size}" }}
}}"#
    )
}
