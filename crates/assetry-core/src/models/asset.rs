use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::{LOCAL_REPO, SVG_SUBTYPE};

/// Asset type, derived from the top-level MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Image,
    Video,
    Audio,
    #[default]
    Other,
}

impl AssetType {
    /// Map a top-level MIME type ("image", "video", ...) to an asset type.
    /// Anything that is not image, video or audio is `Other`.
    pub fn from_mime_type(top_level: &str) -> Self {
        match top_level.to_ascii_lowercase().as_str() {
            "image" => AssetType::Image,
            "video" => AssetType::Video,
            "audio" => AssetType::Audio,
            _ => AssetType::Other,
        }
    }
}

impl FromStr for AssetType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(AssetType::Image),
            "video" => Ok(AssetType::Video),
            "audio" => Ok(AssetType::Audio),
            "other" => Ok(AssetType::Other),
            _ => Err(anyhow::anyhow!("Invalid asset type: {}", s)),
        }
    }
}

impl Display for AssetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AssetType::Image => write!(f, "image"),
            AssetType::Video => write!(f, "video"),
            AssetType::Audio => write!(f, "audio"),
            AssetType::Other => write!(f, "other"),
        }
    }
}

/// Whether an asset of this type/subtype gets a thumbnail (and derived
/// technical metadata). SVG images are excluded.
pub fn thumb_eligible(asset_type: AssetType, subtype: &str) -> bool {
    match asset_type {
        AssetType::Video => true,
        AssetType::Image => !subtype.eq_ignore_ascii_case(SVG_SUBTYPE),
        AssetType::Audio | AssetType::Other => false,
    }
}

/// Persisted description of a managed file.
///
/// `path` is a storage key relative to the root of the owning asset
/// instance; it only becomes a filesystem location once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub repo: String,
    #[serde(rename = "type", default)]
    pub asset_type: AssetType,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub has_thumb: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl AssetRecord {
    pub fn new(repo: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: None,
            path: Some(path.into()),
            repo: repo.into(),
            asset_type: AssetType::Other,
            subtype: String::new(),
            size: 0,
            has_thumb: false,
            resolution: None,
            duration: None,
        }
    }

    pub fn local(path: impl Into<String>) -> Self {
        Self::new(LOCAL_REPO, path)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set type and subtype, recomputing `has_thumb`.
    pub fn with_type(mut self, asset_type: AssetType, subtype: impl Into<String>) -> Self {
        self.asset_type = asset_type;
        self.subtype = subtype.into();
        self.has_thumb = thumb_eligible(self.asset_type, &self.subtype);
        self
    }

    /// Last component of `path`.
    pub fn filename(&self) -> Option<&str> {
        self.path
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .and_then(|n| n.to_str())
    }

    /// Last component of `path` without its extension (names the thumbnail
    /// when the record has no id). Parent folders are dropped.
    pub fn file_stem(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(|p| Path::new(p).file_stem())
            .map(|s| s.to_string_lossy().into_owned())
    }

    /// Merge a partial update into this record. A root override carried by
    /// the update is returned to the caller instead of being stored.
    pub fn apply(&mut self, update: AssetUpdate) -> Option<PathBuf> {
        let AssetUpdate {
            id,
            path,
            repo,
            asset_type,
            subtype,
            size,
            has_thumb,
            resolution,
            duration,
            root,
        } = update;

        if let Some(id) = id {
            self.id = Some(id);
        }
        if let Some(path) = path {
            self.path = Some(path);
        }
        if let Some(repo) = repo {
            self.repo = repo;
        }
        if let Some(asset_type) = asset_type {
            self.asset_type = asset_type;
        }
        if let Some(subtype) = subtype {
            self.subtype = subtype;
        }
        if let Some(size) = size {
            self.size = size;
        }
        if let Some(has_thumb) = has_thumb {
            self.has_thumb = has_thumb;
        }
        if let Some(resolution) = resolution {
            self.resolution = Some(resolution);
        }
        if let Some(duration) = duration {
            self.duration = Some(duration);
        }
        root
    }

    /// Replace the derived technical metadata with `metadata`.
    ///
    /// Resolution and duration always follow the latest probe, so values
    /// left over from previous content are cleared. Size is only replaced
    /// when the probe reported one.
    pub fn apply_metadata(&mut self, metadata: AssetMetadata) {
        self.resolution = metadata.resolution;
        self.duration = if self.asset_type == AssetType::Video {
            metadata.duration
        } else {
            None
        };
        if let Some(size) = metadata.size {
            self.size = size;
        }
    }
}

/// Explicit partial update of an [`AssetRecord`]; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetUpdate {
    pub id: Option<String>,
    pub path: Option<String>,
    pub repo: Option<String>,
    pub asset_type: Option<AssetType>,
    pub subtype: Option<String>,
    pub size: Option<u64>,
    pub has_thumb: Option<bool>,
    pub resolution: Option<String>,
    pub duration: Option<u64>,
    /// Per-instance root override; never stored in the record
    pub root: Option<PathBuf>,
}

/// Technical metadata derived by probing the content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl AssetMetadata {
    pub fn is_empty(&self) -> bool {
        self.resolution.is_none() && self.duration.is_none() && self.size.is_none()
    }
}
