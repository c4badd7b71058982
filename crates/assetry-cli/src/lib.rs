use anyhow::Context;
use assetry_core::{AssetRecord, AssetType};
use assetry_processing::MimeLookup;

/// Record for a `local` asset at `path`.
///
/// Type and subtype given on the command line win; otherwise they are
/// guessed from the file name.
pub fn local_record(
    path: &str,
    id: Option<String>,
    asset_type: Option<&str>,
    subtype: Option<String>,
    mime: &dyn MimeLookup,
) -> anyhow::Result<AssetRecord> {
    let (guessed_type, guessed_subtype) = mime.lookup_or_default(path);
    let asset_type = match asset_type {
        Some(t) => t
            .parse::<AssetType>()
            .with_context(|| format!("Invalid --type '{}'", t))?,
        None => guessed_type,
    };
    let subtype = subtype.unwrap_or(guessed_subtype);

    let mut record = AssetRecord::local(path).with_type(asset_type, subtype);
    record.id = id;
    Ok(record)
}

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays
/// machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
