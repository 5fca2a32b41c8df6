use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// What a request expects to get back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Texture,
    Model,
    EnvironmentMap,
}

impl AssetKind {
    fn tag(&self) -> &'static str {
        match self {
            Self::Texture => "texture",
            Self::Model => "model",
            Self::EnvironmentMap => "envmap",
        }
    }
}

/// Stable asset identifier derived from the request kind and path.
///
/// The same (kind, path) always maps to the same id, across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

impl AssetId {
    pub fn for_path(kind: AssetKind, path: &Path) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(kind.tag().as_bytes());
        hasher.update([0u8]);
        hasher.update(path.to_string_lossy().as_bytes());
        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[..8]);
        AssetId(u64::from_le_bytes(bytes))
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A single load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub id: AssetId,
    pub kind: AssetKind,
    pub path: PathBuf,
}

impl AssetRequest {
    pub fn new(kind: AssetKind, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: AssetId::for_path(kind, &path),
            kind,
            path,
        }
    }
}
