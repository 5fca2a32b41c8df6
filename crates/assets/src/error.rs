use std::path::PathBuf;

/// Errors from loading or decoding an asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("unsupported asset: {0}")]
    Unsupported(String),
}
