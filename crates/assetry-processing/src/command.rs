//! External tool invocation.
//!
//! Tools are started with an explicit program and argument list, never
//! through a shell. [`CommandRunner`] is the seam between the generation
//! logic and the OS so the former can be exercised without real binaries.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// A fully specified tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory the tool is started in
    pub cwd: PathBuf,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    /// Printable command line (for logs and error reports).
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("\"{}\"", part)
                } else {
                    part.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run through `runner` and require a zero exit status.
    pub async fn execute(&self, runner: &dyn CommandRunner) -> Result<ToolOutput, ToolError> {
        let output = runner.run(self).await?;
        if !output.success {
            return Err(ToolError::Exit {
                status: output
                    .code
                    .map(|c| format!("exit code {}", c))
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// Captured result of a finished tool process.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Why a tool invocation failed
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to start: {0}")]
    Spawn(#[source] io::Error),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("{status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("unreadable output: {0}")]
    Output(String),
}

/// Executes tool invocations.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput, ToolError>;
}

/// Runs tools as child processes.
///
/// Without a timeout the caller waits for the tool to exit, however long
/// that takes, and a dropped caller leaves the process running to
/// completion. With a timeout the process is killed once it elapses.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    #[tracing::instrument(skip(self, command), fields(
        process.executable.name = %command.program,
        process.command = %command.command_line(),
        process.cwd = %command.cwd.display()
    ))]
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(self.timeout.is_some());

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| ToolError::TimedOut(limit))?,
            None => cmd.output().await,
        }
        .map_err(ToolError::Spawn)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            exit_code = ?output.status.code(),
            "Tool process finished"
        );

        Ok(ToolOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
