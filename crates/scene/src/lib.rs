//! Scene Host: scene graph, camera, viewport, and the renderer-agnostic
//! render interface.
//!
//! # Invariants
//! - The scene graph is append-only; objects are never removed.
//! - Renderers read the scene; they never mutate it.
//! - `resize` with unchanged dimensions has no side effects.
//! - Rendering never waits on assets. Objects that depend on an asset appear
//!   only once its completion has been drained on the control thread.
//!
//! # Backends
//! [`DebugTextRenderer`] describes each frame as text and backs tests and
//! headless runs. The GPU backend lives in `shaderbox-render-wgpu`.

mod camera;
mod error;
mod geometry;
mod host;
mod material;
mod materials;
mod model;
mod object;
mod renderer;
mod scene;

pub use camera::{Camera, OrbitControls};
pub use error::{InitError, RenderError};
pub use geometry::Geometry;
pub use host::SceneHost;
pub use material::{Material, ShaderMaterial, ShaderProgram, ShaderUniforms, StandardMaterial};
pub use materials::{MaterialConfig, MaterialError, MaterialTable};
pub use model::{ModelInstance, instantiate_model};
pub use object::{MeshObject, ObjectKind, PointLight, SceneObject};
pub use renderer::{DebugTextRenderer, RenderBackend};
pub use scene::Scene;
