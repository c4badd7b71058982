//! Assetry Processing Library
//!
//! Thumbnail and metadata generation for stored assets, built on the
//! standalone ffmpeg/ffprobe binaries, and the upload/replace pipeline that
//! sequences storage and generation.
//!
//! The media tools always run as separate processes on a local working
//! copy of the content; they are never linked in-process.

pub mod command;
pub mod prober;
pub mod temp;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod toolkit;
pub mod transcoder;
pub mod upload;

// Re-export commonly used types
pub use command::{CommandRunner, ProcessRunner, ToolCommand, ToolOutput};
pub use prober::{ProbeReport, Prober};
pub use toolkit::{MediaToolkit, ThumbOptions};
pub use transcoder::Transcoder;
pub use upload::{get_file_extension, update_file, GuessMimeLookup, MimeLookup, UploadedFile};
