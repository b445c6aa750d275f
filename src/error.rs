//! Error taxonomy shared by the rendering pipeline.

use std::path::PathBuf;

/// Convenience result type used across the crate.
pub type LeafletResult<T> = Result<T, LeafletError>;

/// Errors surfaced by rendering, preloading and export.
#[derive(thiserror::Error, Debug)]
pub enum LeafletError {
    /// The requested preset id is not in the catalog.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// An image resource failed to read or decode.
    #[error("failed to load image `{}`: {source}", path.display())]
    ResourceLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A font file failed to load into the font database.
    #[error("failed to load font `{}`: {source}", path.display())]
    FontLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The surface could not be serialized to an image blob.
    #[error("export failed: {0}")]
    Export(String),

    /// A preset catalog or render config could not be parsed.
    #[error("invalid catalog: {0}")]
    Catalog(#[from] serde_json::Error),
}

impl LeafletError {
    /// Build a [`LeafletError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`LeafletError::ResourceLoad`] value.
    pub fn resource(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::ResourceLoad {
            path: path.into(),
            source,
        }
    }
}
