//! Types for the upload pipeline.

use std::path::PathBuf;

/// A file received by the host and spooled to local disk.
///
/// The pipeline takes ownership of `temp_path` and removes it once the
/// content has been stored.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub temp_path: PathBuf,
    /// Name the client sent; only its extension and MIME type are used
    pub original_filename: String,
    pub size: u64,
}

impl UploadedFile {
    pub fn new(temp_path: impl Into<PathBuf>, original_filename: impl Into<String>, size: u64) -> Self {
        Self {
            temp_path: temp_path.into(),
            original_filename: original_filename.into(),
            size,
        }
    }
}
