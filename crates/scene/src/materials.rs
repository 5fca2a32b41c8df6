use serde::{Deserialize, Serialize};
use shaderbox_assets::ModelData;
use shaderbox_common::Color;
use std::collections::BTreeMap;

use crate::material::StandardMaterial;

#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("invalid material table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("material table names mesh {0:?}, which the model does not contain")]
    UnknownMesh(String),
}

/// Authoring-time material record for one mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
    /// Whether the scene environment map feeds reflections.
    pub uses_environment: bool,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        let standard = StandardMaterial::default();
        Self {
            color: standard.color,
            emissive: standard.emissive,
            emissive_intensity: standard.emissive_intensity,
            roughness: standard.roughness,
            metalness: standard.metalness,
            uses_environment: true,
        }
    }
}

impl MaterialConfig {
    pub fn to_material(&self) -> StandardMaterial {
        StandardMaterial {
            color: self.color,
            emissive: self.emissive,
            emissive_intensity: self.emissive_intensity,
            roughness: self.roughness,
            metalness: self.metalness,
            env_map_intensity: if self.uses_environment { 1.0 } else { 0.0 },
        }
    }
}

/// Explicit mapping from a model's stable mesh ids to materials.
///
/// Meshes without an entry get `fallback`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialTable {
    #[serde(default)]
    pub fallback: MaterialConfig,
    #[serde(default)]
    pub meshes: BTreeMap<String, MaterialConfig>,
}

impl MaterialTable {
    pub fn from_json(text: &str) -> Result<Self, MaterialError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_mesh(mut self, mesh_id: impl Into<String>, config: MaterialConfig) -> Self {
        self.meshes.insert(mesh_id.into(), config);
        self
    }

    /// Every table key must name a mesh of `model`.
    pub fn validate(&self, model: &ModelData) -> Result<(), MaterialError> {
        for key in self.meshes.keys() {
            if !model.mesh_ids().any(|id| id == key) {
                return Err(MaterialError::UnknownMesh(key.clone()));
            }
        }
        Ok(())
    }

    /// Mesh ids of `model` that fall back to the default material.
    pub fn unmapped<'a>(&self, model: &'a ModelData) -> Vec<&'a str> {
        model
            .mesh_ids()
            .filter(|id| !self.meshes.contains_key(*id))
            .collect()
    }

    pub fn resolve(&self, mesh_id: &str) -> StandardMaterial {
        self.meshes
            .get(mesh_id)
            .unwrap_or(&self.fallback)
            .to_material()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use shaderbox_assets::ModelMesh;
    use shaderbox_common::MeshData;
    use std::sync::Arc;

    fn model(ids: &[&str]) -> ModelData {
        ModelData {
            meshes: ids
                .iter()
                .map(|id| ModelMesh {
                    id: id.to_string(),
                    mesh: Arc::new(MeshData::default()),
                    transform: Mat4::IDENTITY,
                })
                .collect(),
            lights: Vec::new(),
        }
    }

    const TABLE: &str = r##"{
        "fallback": { "color": "#808080", "roughness": 0.8 },
        "meshes": {
            "LampShade": { "color": "#ffffff", "emissive": "#ffd27f", "emissive_intensity": 2.0 },
            "Chrome": { "metalness": 1.0, "roughness": 0.05 }
        }
    }"##;

    #[test]
    fn parses_and_resolves() {
        let table = MaterialTable::from_json(TABLE).unwrap();
        let shade = table.resolve("LampShade");
        assert_eq!(shade.emissive, Color::parse("#ffd27f").unwrap());
        assert_eq!(shade.emissive_intensity, 2.0);

        let other = table.resolve("Base");
        assert_eq!(other.color, Color::parse("#808080").unwrap());
        assert_eq!(other.roughness, 0.8);
    }

    #[test]
    fn validate_rejects_unknown_mesh() {
        let table = MaterialTable::from_json(TABLE).unwrap();
        let err = table.validate(&model(&["LampShade", "Base"])).unwrap_err();
        assert!(matches!(err, MaterialError::UnknownMesh(ref id) if id == "Chrome"));
        assert!(table.validate(&model(&["LampShade", "Chrome", "Base"])).is_ok());
    }

    #[test]
    fn unmapped_lists_fallback_meshes() {
        let table = MaterialTable::default().with_mesh("A", MaterialConfig::default());
        let m = model(&["A", "B", "C"]);
        assert_eq!(table.unmapped(&m), vec!["B", "C"]);
    }

    #[test]
    fn bad_color_is_json_error() {
        let err = MaterialTable::from_json(r#"{ "fallback": { "color": "red" } }"#).unwrap_err();
        assert!(matches!(err, MaterialError::Json(_)));
    }
}
