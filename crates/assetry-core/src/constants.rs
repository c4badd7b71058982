//! Shared constants for assets, thumbnails and external media tools.

/// Discriminator of the local filesystem backend.
pub const LOCAL_REPO: &str = "local";

/// Image subtype that never receives a thumbnail.
pub const SVG_SUBTYPE: &str = "svg+xml";

/// Prefix of the working copy handed to ffmpeg/ffprobe.
pub const TEMP_FILE_PREFIX: &str = "tmp_";

/// Seek offset applied to videos before extracting the thumbnail frame.
/// The first frames of many videos are black.
pub const VIDEO_THUMB_SEEK: &str = "00:00:05.000";

pub const DEFAULT_THUMBNAIL_EXT: &str = ".png";
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 400;
pub const DEFAULT_THUMBNAIL_DIR_NAME: &str = "thumbs";
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";
