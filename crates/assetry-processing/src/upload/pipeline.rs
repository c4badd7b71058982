//! Replacing an asset's content with an uploaded file.

use std::path::Path;

use assetry_core::models::thumb_eligible;
use assetry_core::{AssetError, AssetRecord, AssetResult, AssetUpdate};
use assetry_storage::{Asset, AssetRegistry};
use uuid::Uuid;

use super::mime::MimeLookup;
use super::types::UploadedFile;
use crate::toolkit::{MediaToolkit, ThumbOptions};

/// Last dot-separated segment of `filename`'s final path component.
pub fn get_file_extension(filename: &str) -> AssetResult<String> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Ok(ext.to_string()),
        _ => Err(AssetError::ParseExtension(filename.to_string())),
    }
}

/// A `local` asset wrapping the spooled upload so it can be streamed and
/// removed like any other content.
fn upload_asset(registry: &AssetRegistry, temp_path: &Path) -> AssetResult<Asset> {
    let name = temp_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            AssetError::InvalidParams(format!("invalid upload path '{}'", temp_path.display()))
        })?;
    let dir = temp_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    registry.create_asset_in(AssetRecord::local(name), dir)
}

/// Replace the content of `asset` with `upload`.
///
/// The old content and its thumbnail are removed first and are not
/// restored if a later step fails. The new content is stored at
/// `<id>.<ext>` (a fresh UUID stands in for a missing id), then the
/// thumbnail is regenerated and the record's metadata re-probed.
#[tracing::instrument(skip_all, fields(
    asset.id = ?asset.record().id,
    upload.filename = %upload.original_filename
))]
pub async fn update_file(
    asset: &mut Asset,
    upload: UploadedFile,
    toolkit: &MediaToolkit,
    mime: &dyn MimeLookup,
) -> AssetResult<AssetRecord> {
    let start = std::time::Instant::now();

    let extension = get_file_extension(&upload.original_filename)?;
    let (asset_type, subtype) = mime.lookup_or_default(&upload.original_filename);

    asset.delete().await?;

    let stem = asset
        .record()
        .id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let path = format!("{}.{}", stem, extension);
    let has_thumb = thumb_eligible(asset_type, &subtype);

    asset.set_data(AssetUpdate {
        path: Some(path.clone()),
        asset_type: Some(asset_type),
        subtype: Some(subtype),
        has_thumb: Some(has_thumb),
        ..Default::default()
    });

    let uploaded = upload_asset(asset.registry(), &upload.temp_path)?;
    let written = asset.write(uploaded.read().await?, &path).await?;
    uploaded.delete().await?;
    // Size is the stored byte count unless the probe reports a container size
    asset.set_data(AssetUpdate {
        size: Some(written),
        ..Default::default()
    });

    toolkit
        .generate_thumb(asset, ThumbOptions::regenerate())
        .await?;
    let metadata = toolkit.generate_metadata(asset).await?;
    let record = asset.apply_metadata(metadata).clone();

    tracing::info!(
        path = %path,
        asset_type = %record.asset_type,
        size_bytes = record.size,
        duration_ms = start.elapsed().as_millis(),
        "Asset content replaced"
    );

    Ok(record)
}
