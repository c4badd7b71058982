//! Upload/replace pipeline: delete old content → store new content →
//! regenerate thumbnail → probe metadata.

mod mime;
mod pipeline;
mod types;

pub use mime::{GuessMimeLookup, MimeLookup};
pub use pipeline::{get_file_extension, update_file};
pub use types::UploadedFile;
