//! wgpu render backend for shaderbox scenes.
//!
//! Draws shader-material meshes (wave, displace), lit standard-material
//! meshes and an optional equirectangular sky. The frame is left
//! unpresented after [`RenderBackend::render`](shaderbox_scene::RenderBackend)
//! so the app can draw its overlay on top before presenting.
//!
//! # Invariants
//! - The backend never mutates the scene.
//! - A lost or outdated surface is reconfigured and the frame skipped.
//! - GPU buffers are created lazily per object; objects are never removed.

mod gpu;
mod layout;
mod shaders;
mod upload;

pub use gpu::{FrameTarget, WgpuBackend};
