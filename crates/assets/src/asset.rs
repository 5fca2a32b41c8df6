use glam::{Mat4, Vec3};
use shaderbox_common::{ImageData, MeshData};
use std::sync::Arc;

/// One mesh primitive of a model, flattened to model space.
#[derive(Debug, Clone)]
pub struct ModelMesh {
    /// Stable identifier: the glTF mesh name (or `mesh_<index>`), with a
    /// `#<primitive>` suffix when a mesh has several primitives.
    pub id: String,
    pub mesh: Arc<MeshData>,
    /// Node transform accumulated from the scene root.
    pub transform: Mat4,
}

/// A punctual point light shipped inside a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelLight {
    pub id: String,
    pub position: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
    pub range: Option<f32>,
}

/// Decoded model.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub meshes: Vec<ModelMesh>,
    pub lights: Vec<ModelLight>,
}

impl ModelData {
    pub fn mesh_ids(&self) -> impl Iterator<Item = &str> {
        self.meshes.iter().map(|m| m.id.as_str())
    }
}

/// A successfully loaded asset.
#[derive(Debug, Clone)]
pub enum Asset {
    Texture(Arc<ImageData>),
    Model(Arc<ModelData>),
    Environment(Arc<ImageData>),
}

impl Asset {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Texture(_) => "texture",
            Self::Model(_) => "model",
            Self::Environment(_) => "environment map",
        }
    }
}
