use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use shaderbox_common::Color;
use shaderbox_scene::{Camera, Material, PointLight, Scene};

/// Lights beyond this count are ignored by the lit pipeline.
pub const MAX_LIGHTS: usize = 8;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct GpuLight {
    /// xyz world position, w range (0 = unbounded).
    pub position: [f32; 4],
    /// rgb color, w intensity.
    pub color: [f32; 4],
}

impl GpuLight {
    fn new(position: Vec3, light: &PointLight) -> Self {
        Self {
            position: position.extend(light.range).to_array(),
            color: rgba(light.color, light.intensity),
        }
    }
}

/// Per-frame data shared by every pipeline (bind group 0).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    /// x holds the light count.
    pub light_count: [u32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl FrameUniforms {
    pub fn new(scene: &Scene, camera: &Camera) -> Self {
        let view_proj = camera.view_projection();
        let mut lights = [GpuLight::default(); MAX_LIGHTS];
        let mut count = 0;
        for (slot, (_, position, light)) in lights.iter_mut().zip(scene.lights()) {
            *slot = GpuLight::new(position, light);
            count += 1;
        }
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            ambient: rgba(scene.ambient, 1.0),
            light_count: [count, 0, 0, 0],
            lights,
        }
    }
}

/// Per-object data (bind group 1).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    /// Shader: first blend color. Standard: base color.
    pub color1: [f32; 4],
    /// Shader: second blend color. Standard: emissive, w intensity.
    pub color2: [f32; 4],
    /// x time, y wave, z amplitude, w environment intensity.
    pub params: [f32; 4],
    /// xy resolution, z roughness, w metalness.
    pub extra: [f32; 4],
}

impl ObjectUniforms {
    pub fn new(model: Mat4, material: &Material) -> Self {
        let model = model.to_cols_array_2d();
        match material {
            Material::Shader(shader) => {
                let u = &shader.uniforms;
                Self {
                    model,
                    color1: rgba(u.color1, 1.0),
                    color2: rgba(u.color2, 1.0),
                    params: [u.time, u.wave, u.amplitude, 0.0],
                    extra: [u.resolution.x, u.resolution.y, 0.0, 0.0],
                }
            }
            Material::Standard(m) => Self {
                model,
                color1: rgba(m.color, 1.0),
                color2: rgba(m.emissive, m.emissive_intensity),
                params: [0.0, 0.0, 0.0, m.env_map_intensity],
                extra: [0.0, 0.0, m.roughness, m.metalness],
            },
        }
    }
}

fn rgba(color: Color, w: f32) -> [f32; 4] {
    [color.r, color.g, color.b, w]
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderbox_scene::{ShaderMaterial, ShaderProgram, ShaderUniforms, StandardMaterial};

    #[test]
    fn uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<GpuLight>() % 16, 0);
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniforms>() % 16, 0);
    }

    #[test]
    fn shader_material_packs_time_and_wave() {
        let uniforms = ShaderUniforms {
            time: 1.5,
            wave: 12.0,
            ..ShaderUniforms::default()
        };
        let packed = ObjectUniforms::new(
            Mat4::IDENTITY,
            &Material::Shader(ShaderMaterial::new(ShaderProgram::Wave, uniforms)),
        );
        assert_eq!(packed.params[0], 1.5);
        assert_eq!(packed.params[1], 12.0);
        assert_eq!(packed.extra[..2], [1280.0, 720.0]);
    }

    #[test]
    fn standard_material_packs_emissive_intensity() {
        let material = StandardMaterial {
            emissive: Color::WHITE,
            emissive_intensity: 3.0,
            roughness: 0.25,
            ..StandardMaterial::default()
        };
        let packed = ObjectUniforms::new(Mat4::IDENTITY, &Material::Standard(material));
        assert_eq!(packed.color2, [1.0, 1.0, 1.0, 3.0]);
        assert_eq!(packed.extra[2], 0.25);
    }

    #[test]
    fn frame_caps_light_count() {
        let mut scene = Scene::new();
        for i in 0..MAX_LIGHTS + 3 {
            scene.add(shaderbox_scene::SceneObject::point_light(
                format!("l{i}"),
                PointLight::default(),
            ));
        }
        let frame = FrameUniforms::new(&scene, &Camera::default());
        assert_eq!(frame.light_count[0], MAX_LIGHTS as u32);
    }
}
