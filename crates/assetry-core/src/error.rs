//! Error types module
//!
//! Every asset operation reports failures through [`AssetError`]. OS-level
//! errors are only translated where the distinction matters (existence
//! checks); everything else travels unchanged inside [`AssetError::Io`].
//! Failures of external tools always carry the full command line and the
//! working directory the tool was started from.

use std::io;
use std::path::PathBuf;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like missing files
    Debug,
    /// Warning level - for failures of external tools
    Warn,
    /// Error level - for programming errors and unexpected I/O failures
    Error,
}

/// Metadata describing how an error should be reported by callers
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Whether the failed operation may succeed if attempted again
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Could not parse file extension from '{0}'")]
    ParseExtension(String),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Transcoder failed: {message} (command: {command}, cwd: {})", cwd.display())]
    TranscoderFailure {
        command: String,
        cwd: PathBuf,
        message: String,
    },

    #[error("Prober failed: {message} (command: {command}, cwd: {})", cwd.display())]
    ProberFailure {
        command: String,
        cwd: PathBuf,
        message: String,
    },

    #[error("Function not overridden: {0}")]
    FunctionNotOverridden(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

impl AssetError {
    pub fn not_found(what: impl AsRef<std::path::Path>) -> Self {
        AssetError::NotFound(what.as_ref().display().to_string())
    }

    /// Whether this error reports a missing storage entry
    pub fn is_not_found(&self) -> bool {
        matches!(self, AssetError::NotFound(_))
    }
}

/// (error_code, recoverable, log_level) per variant.
fn asset_error_static_metadata(err: &AssetError) -> (&'static str, bool, LogLevel) {
    match err {
        AssetError::InvalidParams(_) => ("INVALID_PARAMS", false, LogLevel::Debug),
        AssetError::ParseExtension(_) => ("PARSE_EXTENSION", false, LogLevel::Debug),
        AssetError::NotFound(_) => ("NOT_FOUND", false, LogLevel::Debug),
        AssetError::TranscoderFailure { .. } => ("TRANSCODER_FAILURE", false, LogLevel::Warn),
        AssetError::ProberFailure { .. } => ("PROBER_FAILURE", false, LogLevel::Warn),
        AssetError::FunctionNotOverridden(_) => {
            ("FUNCTION_NOT_OVERRIDDEN", false, LogLevel::Error)
        }
        AssetError::InvalidConfig(_) => ("INVALID_CONFIG", false, LogLevel::Error),
        AssetError::Io(_) => ("IO_ERROR", true, LogLevel::Error),
    }
}

impl ErrorMetadata for AssetError {
    fn error_code(&self) -> &'static str {
        asset_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        asset_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        asset_error_static_metadata(self).2
    }
}
