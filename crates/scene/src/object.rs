use shaderbox_common::{Color, ObjectId, Transform};

use crate::geometry::Geometry;
use crate::material::{Material, ShaderUniforms};

#[derive(Debug, Clone, PartialEq)]
pub struct MeshObject {
    pub geometry: Geometry,
    pub material: Material,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    /// Distance at which the light has faded out; `0.0` means unbounded.
    pub range: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            range: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Mesh(MeshObject),
    PointLight(PointLight),
    /// Transform-only node that other objects hang off.
    Group,
}

/// A node in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    pub parent: Option<ObjectId>,
    pub visible: bool,
    pub kind: ObjectKind,
}

impl SceneObject {
    fn with_kind(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            parent: None,
            visible: true,
            kind,
        }
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self::with_kind(name, ObjectKind::Mesh(MeshObject { geometry, material }))
    }

    pub fn point_light(name: impl Into<String>, light: PointLight) -> Self {
        Self::with_kind(name, ObjectKind::PointLight(light))
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::with_kind(name, ObjectKind::Group)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn as_mesh(&self) -> Option<&MeshObject> {
        match &self.kind {
            ObjectKind::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshObject> {
        match &mut self.kind {
            ObjectKind::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&PointLight> {
        match &self.kind {
            ObjectKind::PointLight(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut PointLight> {
        match &mut self.kind {
            ObjectKind::PointLight(l) => Some(l),
            _ => None,
        }
    }

    /// Uniforms of a shader-material mesh.
    pub fn uniforms_mut(&mut self) -> Option<&mut ShaderUniforms> {
        self.as_mesh_mut()
            .and_then(|m| m.material.as_shader_mut())
            .map(|s| &mut s.uniforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{ShaderMaterial, ShaderProgram, StandardMaterial};

    #[test]
    fn shader_mesh_exposes_uniforms() {
        let mut obj = SceneObject::mesh(
            "cube",
            Geometry::cube(1.0),
            Material::Shader(ShaderMaterial::new(
                ShaderProgram::Wave,
                ShaderUniforms::default(),
            )),
        );
        obj.uniforms_mut().unwrap().time = 2.0;
        assert!(obj.as_light().is_none());
        assert_eq!(obj.uniforms_mut().unwrap().time, 2.0);
    }

    #[test]
    fn standard_mesh_has_no_uniforms() {
        let mut obj = SceneObject::mesh(
            "body",
            Geometry::cube(1.0),
            Material::Standard(StandardMaterial::default()),
        );
        assert!(obj.uniforms_mut().is_none());
    }

    #[test]
    fn lights_start_visible() {
        let light = SceneObject::point_light("lamp", PointLight::default());
        assert!(light.visible);
        assert_eq!(light.as_light().unwrap().color, Color::WHITE);
    }
}
