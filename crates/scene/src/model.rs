use shaderbox_assets::ModelData;
use shaderbox_common::{Color, ObjectId, Transform};

use crate::geometry::Geometry;
use crate::material::Material;
use crate::materials::{MaterialError, MaterialTable};
use crate::object::{PointLight, SceneObject};
use crate::scene::Scene;

/// Objects created for one loaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstance {
    pub root: ObjectId,
    pub meshes: Vec<ObjectId>,
    /// Point lights, in the model's light order.
    pub lights: Vec<ObjectId>,
}

/// Adds `model` to `scene` under a new group placed at `transform`.
///
/// The table is validated first; on error nothing is added.
pub fn instantiate_model(
    scene: &mut Scene,
    name: &str,
    model: &ModelData,
    table: &MaterialTable,
    transform: Transform,
) -> Result<ModelInstance, MaterialError> {
    table.validate(model)?;
    let unmapped = table.unmapped(model);
    if !unmapped.is_empty() {
        tracing::debug!(?unmapped, "meshes using fallback material");
    }

    let root = scene.add(SceneObject::group(name).with_transform(transform));
    let meshes = model
        .meshes
        .iter()
        .map(|m| {
            scene.add(
                SceneObject::mesh(
                    m.id.clone(),
                    Geometry::Mesh(m.mesh.clone()),
                    Material::Standard(table.resolve(&m.id)),
                )
                .with_transform(Transform::from_matrix(m.transform))
                .with_parent(root),
            )
        })
        .collect();
    let lights = model
        .lights
        .iter()
        .map(|l| {
            let light = PointLight {
                color: Color::from_array(l.color),
                intensity: l.intensity,
                range: l.range.unwrap_or(0.0),
            };
            scene.add(
                SceneObject::point_light(l.id.clone(), light)
                    .with_transform(Transform::from_position(l.position))
                    .with_parent(root),
            )
        })
        .collect();

    let instance = ModelInstance {
        root,
        meshes,
        lights,
    };
    tracing::info!(
        name,
        meshes = instance.meshes.len(),
        lights = instance.lights.len(),
        "model instantiated"
    );
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialConfig;
    use glam::{Mat4, Vec3};
    use shaderbox_assets::{ModelLight, ModelMesh};
    use shaderbox_common::MeshData;
    use std::sync::Arc;

    fn lamp_model() -> ModelData {
        ModelData {
            meshes: vec![
                ModelMesh {
                    id: "Base".into(),
                    mesh: Arc::new(MeshData::default()),
                    transform: Mat4::IDENTITY,
                },
                ModelMesh {
                    id: "Shade".into(),
                    mesh: Arc::new(MeshData::default()),
                    transform: Mat4::from_translation(Vec3::Y),
                },
            ],
            lights: vec![ModelLight {
                id: "Bulb".into(),
                position: Vec3::new(0.0, 1.5, 0.0),
                color: [1.0, 0.5, 0.0],
                intensity: 3.0,
                range: None,
            }],
        }
    }

    #[test]
    fn instantiates_meshes_and_lights_under_root() {
        let mut scene = Scene::new();
        let table = MaterialTable::default().with_mesh(
            "Shade",
            MaterialConfig {
                emissive: Color::WHITE,
                ..MaterialConfig::default()
            },
        );
        let instance = instantiate_model(
            &mut scene,
            "lamp",
            &lamp_model(),
            &table,
            Transform::from_position(Vec3::new(2.0, 0.0, 0.0)),
        )
        .unwrap();

        assert_eq!(scene.len(), 4);
        assert_eq!(instance.meshes.len(), 2);
        assert_eq!(instance.lights.len(), 1);
        for id in instance.meshes.iter().chain(&instance.lights) {
            assert_eq!(scene.get(*id).unwrap().parent, Some(instance.root));
        }

        let bulb = scene.world_matrix(instance.lights[0]).w_axis.truncate();
        assert!((bulb - Vec3::new(2.0, 1.5, 0.0)).length() < 1e-5);

        let shade = scene.get(instance.meshes[1]).unwrap().as_mesh().unwrap();
        match &shade.material {
            Material::Standard(m) => assert_eq!(m.emissive, Color::WHITE),
            other => panic!("unexpected material {other:?}"),
        }
    }

    #[test]
    fn invalid_table_adds_nothing() {
        let mut scene = Scene::new();
        let table = MaterialTable::default().with_mesh("Missing", MaterialConfig::default());
        let err = instantiate_model(
            &mut scene,
            "lamp",
            &lamp_model(),
            &table,
            Transform::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MaterialError::UnknownMesh(_)));
        assert!(scene.is_empty());
    }
}
