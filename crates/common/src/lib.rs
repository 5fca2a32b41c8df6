//! Shared value types used across the shaderbox crates.
//!
//! # Invariants
//! - Types here carry data only; no rendering or scheduling behaviour.
//! - Colors are linear RGB in `[0, 1]` per channel.

mod color;
mod data;
mod types;
mod viewport;

pub use color::{Color, ColorParseError};
pub use data::{ImageData, ImageFormat, MeshData};
pub use types::{ObjectId, Transform};
pub use viewport::Viewport;
