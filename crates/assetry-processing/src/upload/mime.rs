use assetry_core::AssetType;

/// Resolves a filename to its asset type and MIME subtype.
pub trait MimeLookup: Send + Sync {
    fn lookup(&self, filename: &str) -> Option<(AssetType, String)>;

    /// Like [`MimeLookup::lookup`], falling back to `other` / `octet-stream`.
    fn lookup_or_default(&self, filename: &str) -> (AssetType, String) {
        self.lookup(filename)
            .unwrap_or_else(|| (AssetType::Other, "octet-stream".to_string()))
    }
}

/// Extension-based lookup backed by `mime_guess`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuessMimeLookup;

impl MimeLookup for GuessMimeLookup {
    fn lookup(&self, filename: &str) -> Option<(AssetType, String)> {
        let mime = mime_guess::from_path(filename).first()?;
        // essence keeps structured suffixes, e.g. "svg+xml"
        let (top_level, subtype) = mime.essence_str().split_once('/')?;
        Some((AssetType::from_mime_type(top_level), subtype.to_string()))
    }
}
