//! Assetry CLI: manage locally stored assets, their thumbnails and
//! probed metadata.
//!
//! Set ASSET_DIR (and optionally THUMBNAIL_DIR, FFMPEG_PATH, ...). Paths
//! are relative to ASSET_DIR unless absolute. Results are printed as JSON.

use anyhow::Context;
use assetry_cli::{init_tracing, local_record};
use assetry_core::{AssetRecord, AssetsConfig};
use assetry_processing::{update_file, GuessMimeLookup, MediaToolkit, ThumbOptions, UploadedFile};
use assetry_storage::AssetRegistry;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "assetry", about = "Local asset storage, thumbnails and metadata")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create (or recreate) the thumbnail of an asset
    Thumb {
        /// Asset path
        path: String,
        /// Asset id; names the thumbnail
        #[arg(long)]
        id: Option<String>,
        /// Asset type: image, video, audio, other
        #[arg(long)]
        r#type: Option<String>,
        /// MIME subtype, e.g. png
        #[arg(long)]
        subtype: Option<String>,
        /// Replace an existing thumbnail
        #[arg(long)]
        regenerate: bool,
    },
    /// Print resolution, duration and size of an asset
    Probe {
        /// Asset path
        path: String,
        #[arg(long)]
        r#type: Option<String>,
        #[arg(long)]
        subtype: Option<String>,
    },
    /// Replace an asset's content with an uploaded file
    Replace {
        /// Spooled upload; consumed on success
        upload: PathBuf,
        /// Original file name of the upload
        #[arg(long)]
        name: String,
        #[arg(long)]
        id: Option<String>,
        /// Current path of the asset being replaced
        #[arg(long)]
        path: Option<String>,
    },
    /// Move an asset to a new path
    Move {
        path: String,
        new_path: String,
    },
    /// Delete an asset and its thumbnail
    Delete {
        path: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        r#type: Option<String>,
        #[arg(long)]
        subtype: Option<String>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = AssetsConfig::from_env().context("Failed to load configuration. Set ASSET_DIR")?;
    let registry = AssetRegistry::from_config(&config);
    let toolkit = MediaToolkit::from_config(&config);
    let mime = GuessMimeLookup;

    match cli.command {
        Commands::Thumb {
            path,
            id,
            r#type,
            subtype,
            regenerate,
        } => {
            let record = local_record(&path, id, r#type.as_deref(), subtype, &mime)?;
            let asset = registry.create_asset(record)?;
            asset.ensure_exists().await?;
            toolkit
                .generate_thumb(&asset, ThumbOptions { regenerate })
                .await?;

            if asset.record().has_thumb {
                let thumb = asset.thumb()?;
                print_json(&serde_json::json!({
                    "thumbnail": thumb.record(),
                    "location": thumb.full_path()?,
                }))?;
            } else {
                print_json(&serde_json::json!({ "thumbnail": null }))?;
            }
        }
        Commands::Probe {
            path,
            r#type,
            subtype,
        } => {
            let record = local_record(&path, None, r#type.as_deref(), subtype, &mime)?;
            let asset = registry.create_asset(record)?;
            asset.ensure_exists().await?;
            let metadata = toolkit.generate_metadata(&asset).await?;
            print_json(&metadata)?;
        }
        Commands::Replace {
            upload,
            name,
            id,
            path,
        } => {
            let size = tokio::fs::metadata(&upload)
                .await
                .with_context(|| format!("Cannot read upload {}", upload.display()))?
                .len();

            let record = match path {
                Some(path) => local_record(&path, id, None, None, &mime)?,
                None => AssetRecord {
                    path: None,
                    id,
                    ..AssetRecord::local("")
                },
            };
            let mut asset = registry.create_asset(record)?;

            let record = update_file(
                &mut asset,
                UploadedFile::new(upload, name, size),
                &toolkit,
                &mime,
            )
            .await?;
            print_json(&record)?;
        }
        Commands::Move { path, new_path } => {
            let record = local_record(&path, None, None, None, &mime)?;
            let mut asset = registry.create_asset(record)?;
            asset.move_to(&new_path).await?;
            print_json(asset.record())?;
        }
        Commands::Delete {
            path,
            id,
            r#type,
            subtype,
        } => {
            let record = local_record(&path, id, r#type.as_deref(), subtype, &mime)?;
            let asset = registry.create_asset(record)?;
            asset.delete().await?;
            print_json(&serde_json::json!({
                "success": true,
                "message": format!("Asset {} deleted", path),
            }))?;
        }
    }

    Ok(())
}
