//! Asset loading: stable ids, a threaded file loader, and the completion queue.
//!
//! Loads run off the control thread. Their results come back as
//! [`AssetEvent`]s on a channel that the scene host drains between frames,
//! so completions are ordered relative to the frame loop and never race it.
//!
//! # Invariants
//! - Every request ends in exactly one `Loaded` or `Failed` event, or in
//!   none at all if the loader never resolves it.
//! - A failed load is recoverable: it marks the asset unavailable and
//!   nothing else.
//! - If the receiving host is gone, results are dropped, never applied.

mod asset;
mod decode;
mod error;
mod id;
mod loader;
mod queue;
mod tracker;

pub use asset::{Asset, ModelData, ModelLight, ModelMesh};
pub use decode::{decode_environment, decode_model, decode_texture};
pub use error::AssetError;
pub use id::{AssetId, AssetKind, AssetRequest};
pub use loader::{AssetLoader, FileLoader};
pub use queue::{AssetEvent, AssetInbox, AssetOutbox, asset_channel};
pub use tracker::{AssetStatus, AssetTracker};
