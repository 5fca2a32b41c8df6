use glam::Mat4;
use shaderbox_common::{Color, ImageData, ObjectId};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::material::ShaderUniforms;
use crate::object::{PointLight, SceneObject};

/// Append-only scene graph.
///
/// Iteration follows insertion order so renderers and debug output are
/// deterministic.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
    order: Vec<ObjectId>,
    pub background: Color,
    pub ambient: Color,
    /// Equirectangular map used for background and reflections once loaded.
    pub environment: Option<Arc<ImageData>>,
    /// Draw the environment map as the background when one is loaded.
    pub show_environment: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            order: Vec::new(),
            background: Color::BLACK,
            ambient: Color::new(0.1, 0.1, 0.1),
            environment: None,
            show_environment: true,
        }
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId::new();
        tracing::debug!(id = %id.short(), name = %object.name, "scene object added");
        self.objects.insert(id, object);
        self.order.push(id);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.order
            .iter()
            .filter_map(|id| self.objects.get(id).map(|o| (*id, o)))
    }

    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.iter().find(|(_, o)| o.name == name).map(|(id, _)| id)
    }

    /// Point lights with their world-space positions.
    pub fn lights(&self) -> impl Iterator<Item = (ObjectId, glam::Vec3, &PointLight)> {
        self.iter().filter_map(|(id, o)| {
            o.as_light().map(|l| {
                let pos = self.world_matrix(id).w_axis.truncate();
                (id, pos, l)
            })
        })
    }

    /// Composed transform from the root down to `id`.
    ///
    /// Returns identity for unknown ids. Parent chains are acyclic since a
    /// parent must exist before its child is added.
    pub fn world_matrix(&self, id: ObjectId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(object) = self.objects.get(&current) else {
                break;
            };
            matrix = object.transform.matrix() * matrix;
            cursor = object.parent;
        }
        matrix
    }

    pub fn shader_uniforms_mut(&mut self, id: ObjectId) -> Option<&mut ShaderUniforms> {
        self.objects.get_mut(&id).and_then(|o| o.uniforms_mut())
    }

    pub fn light_mut(&mut self, id: ObjectId) -> Option<&mut PointLight> {
        self.objects.get_mut(&id).and_then(|o| o.as_light_mut())
    }

    /// Applies `f` to every shader-material mesh.
    pub fn for_each_shader(&mut self, mut f: impl FnMut(&mut ShaderUniforms)) {
        for object in self.objects.values_mut() {
            if let Some(uniforms) = object.uniforms_mut() {
                f(uniforms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::material::{Material, ShaderMaterial, ShaderProgram};
    use glam::Vec3;
    use shaderbox_common::Transform;

    fn cube() -> SceneObject {
        SceneObject::mesh(
            "cube",
            Geometry::cube(3.0),
            Material::Shader(ShaderMaterial::new(
                ShaderProgram::Wave,
                ShaderUniforms::default(),
            )),
        )
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.add(SceneObject::group("a"));
        let b = scene.add(SceneObject::group("b"));
        let c = scene.add(SceneObject::group("c"));
        let ids: Vec<_> = scene.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(scene.find("b"), Some(b));
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut scene = Scene::new();
        let root = scene.add(
            SceneObject::group("root")
                .with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))),
        );
        let child = scene.add(
            SceneObject::point_light("lamp", PointLight::default())
                .with_transform(Transform::from_position(Vec3::new(0.0, 2.0, 0.0)))
                .with_parent(root),
        );
        let pos = scene.world_matrix(child).w_axis.truncate();
        assert!((pos - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);

        let lights: Vec<_> = scene.lights().collect();
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].0, child);
    }

    #[test]
    fn shader_uniforms_only_for_shader_meshes() {
        let mut scene = Scene::new();
        let c = scene.add(cube());
        let g = scene.add(SceneObject::group("g"));
        assert!(scene.shader_uniforms_mut(c).is_some());
        assert!(scene.shader_uniforms_mut(g).is_none());
        assert!(scene.light_mut(c).is_none());
    }

    #[test]
    fn for_each_shader_touches_all_shader_meshes() {
        let mut scene = Scene::new();
        let a = scene.add(cube());
        let b = scene.add(cube());
        scene.for_each_shader(|u| u.time = 4.0);
        assert_eq!(scene.shader_uniforms_mut(a).unwrap().time, 4.0);
        assert_eq!(scene.shader_uniforms_mut(b).unwrap().time, 4.0);
    }
}
