use thiserror::Error;

/// Reasons a source image contributes no tile to a reconstruction.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("source image {uri} failed to load")]
    Decode { uri: String },
    #[error("source image {uri} has no usable pixels: {reason}")]
    Raster { uri: String, reason: String },
}
