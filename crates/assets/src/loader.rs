use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::asset::Asset;
use crate::decode::{decode_environment, decode_texture, import_model};
use crate::error::AssetError;
use crate::id::{AssetKind, AssetRequest};
use crate::queue::{AssetEvent, AssetOutbox};

/// Asynchronous load capability.
///
/// Implementations must not block the caller. The completion (if any) is
/// posted through `outbox`; a loader is allowed to never resolve.
pub trait AssetLoader {
    fn load(&self, request: AssetRequest, outbox: AssetOutbox);
}

/// Loads files under a root directory, one worker thread per request.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Read and decode synchronously. This is what the worker thread runs.
    pub fn load_blocking(root: &Path, request: &AssetRequest) -> Result<Asset, AssetError> {
        let path = root.join(&request.path);
        let read = |p: &Path| {
            std::fs::read(p).map_err(|source| AssetError::Io {
                path: p.to_path_buf(),
                source,
            })
        };
        match request.kind {
            AssetKind::Texture => Ok(Asset::Texture(Arc::new(decode_texture(&read(&path)?)?))),
            AssetKind::EnvironmentMap => Ok(Asset::Environment(Arc::new(decode_environment(
                &read(&path)?,
            )?))),
            AssetKind::Model => {
                if !path.is_file() {
                    return Err(AssetError::Io {
                        path,
                        source: std::io::Error::from(std::io::ErrorKind::NotFound),
                    });
                }
                Ok(Asset::Model(Arc::new(import_model(&path)?)))
            }
        }
    }
}

impl AssetLoader for FileLoader {
    fn load(&self, request: AssetRequest, outbox: AssetOutbox) {
        let root = self.root.clone();
        let thread_request = request.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("asset-{}", request.id))
            .spawn(move || {
                let _span = tracing::debug_span!("asset_load", id = %thread_request.id).entered();
                let event = match Self::load_blocking(&root, &thread_request) {
                    Ok(asset) => {
                        tracing::debug!(path = %thread_request.path.display(), kind = asset.kind_name(), "asset decoded");
                        AssetEvent::Loaded {
                            request: thread_request,
                            asset,
                        }
                    }
                    Err(error) => AssetEvent::Failed {
                        request: thread_request,
                        error,
                    },
                };
                outbox.deliver(event);
            });

        if let Err(source) = spawned {
            tracing::warn!(id = %request.id, "could not spawn loader thread: {source}");
            // The closure (and its outbox) was dropped with the failed spawn.
            // Nothing is delivered; the request stays pending.
        }
    }
}
