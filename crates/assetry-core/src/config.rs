//! Configuration module
//!
//! Settings for asset storage, thumbnail generation and the external media
//! tools, loaded from the environment (and a `.env` file when present).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_FFMPEG_PATH, DEFAULT_FFPROBE_PATH, DEFAULT_THUMBNAIL_DIR_NAME, DEFAULT_THUMBNAIL_EXT,
    DEFAULT_THUMBNAIL_WIDTH,
};

/// Asset module configuration
#[derive(Clone, Debug)]
pub struct AssetsConfig {
    /// Root directory of the local backend
    pub asset_dir: PathBuf,
    pub thumbnail_dir: PathBuf,
    /// Appended to the owning asset's id, e.g. ".png"
    pub thumbnail_ext: String,
    /// Maximum thumbnail width in pixels; height keeps the aspect ratio
    pub thumbnail_width: u32,
    /// Working directory for prober input copies
    pub temp_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Upper bound for a single ffmpeg/ffprobe run. `None` waits forever.
    pub tool_timeout: Option<Duration>,
}

impl AssetsConfig {
    /// Configuration rooted at `asset_dir` with every other option defaulted.
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        let asset_dir = asset_dir.into();
        Self {
            thumbnail_dir: asset_dir.join(DEFAULT_THUMBNAIL_DIR_NAME),
            asset_dir,
            thumbnail_ext: DEFAULT_THUMBNAIL_EXT.to_string(),
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            temp_dir: env::temp_dir(),
            ffmpeg_path: DEFAULT_FFMPEG_PATH.to_string(),
            ffprobe_path: DEFAULT_FFPROBE_PATH.to_string(),
            tool_timeout: None,
        }
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let asset_dir = var("ASSET_DIR")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("ASSET_DIR must be set"))?;

        let mut config = AssetsConfig::new(asset_dir);

        if let Some(dir) = var("THUMBNAIL_DIR") {
            config.thumbnail_dir = PathBuf::from(dir);
        }
        if let Some(ext) = var("THUMBNAIL_EXT") {
            config.thumbnail_ext = normalize_extension(&ext);
        }
        if let Some(width) = var("THUMBNAIL_WIDTH") {
            config.thumbnail_width = width
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("THUMBNAIL_WIDTH must be a valid number"))?;
        }
        if let Some(dir) = var("TEMP_DIR") {
            config.temp_dir = PathBuf::from(dir);
        }
        if let Some(path) = var("FFMPEG_PATH") {
            config.ffmpeg_path = path;
        }
        if let Some(path) = var("FFPROBE_PATH") {
            config.ffprobe_path = path;
        }
        config.tool_timeout = var("TOOL_TIMEOUT_SECS")
            .map(|s| {
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("TOOL_TIMEOUT_SECS must be a valid number"))
            })
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.thumbnail_ext.trim_start_matches('.').is_empty() {
            return Err(anyhow::anyhow!("THUMBNAIL_EXT cannot be empty"));
        }
        if self.thumbnail_width == 0 {
            return Err(anyhow::anyhow!("THUMBNAIL_WIDTH must be greater than zero"));
        }
        validate_tool_path("FFMPEG_PATH", &self.ffmpeg_path)?;
        validate_tool_path("FFPROBE_PATH", &self.ffprobe_path)?;
        Ok(())
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

/// Tool paths are passed straight to the OS; reject anything shell-like.
fn validate_tool_path(name: &str, path: &str) -> Result<(), anyhow::Error> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.trim().is_empty() {
        return Err(anyhow::anyhow!("{} cannot be empty", name));
    }
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow::anyhow!(
            "{} contains dangerous characters: {}",
            name,
            path
        ));
    }
    Ok(())
}
