use glam::Vec2;
use shaderbox_common::{Color, ImageData};
use std::sync::Arc;

/// Which custom shader pair a [`ShaderMaterial`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderProgram {
    /// Texture modulated by a two-color sine wave along the surface.
    Wave,
    /// Vertex displacement by an animated wave; colors blended by height.
    Displace,
}

/// Uniform block shared by the custom shaders.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderUniforms {
    /// Seconds since the clock started.
    pub time: f32,
    pub resolution: Vec2,
    /// Wave frequency.
    pub wave: f32,
    /// Displacement height; unused by [`ShaderProgram::Wave`].
    pub amplitude: f32,
    pub color1: Color,
    pub color2: Color,
    /// `None` until the texture has loaded; backends bind a white pixel.
    pub texture: Option<Arc<ImageData>>,
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            resolution: Vec2::new(1280.0, 720.0),
            wave: 10.0,
            amplitude: 0.0,
            color1: Color::WHITE,
            color2: Color::BLACK,
            texture: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderMaterial {
    pub program: ShaderProgram,
    pub uniforms: ShaderUniforms,
}

impl ShaderMaterial {
    pub fn new(program: ShaderProgram, uniforms: ShaderUniforms) -> Self {
        Self { program, uniforms }
    }
}

/// Lit material for loaded models.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
    /// Weight of the scene environment map in the reflection term.
    pub env_map_intensity: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Color::new(0.8, 0.8, 0.8),
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            roughness: 0.5,
            metalness: 0.0,
            env_map_intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Shader(ShaderMaterial),
    Standard(StandardMaterial),
}

impl Material {
    pub fn as_shader_mut(&mut self) -> Option<&mut ShaderMaterial> {
        match self {
            Self::Shader(s) => Some(s),
            Self::Standard(_) => None,
        }
    }

    pub fn as_standard_mut(&mut self) -> Option<&mut StandardMaterial> {
        match self {
            Self::Standard(s) => Some(s),
            Self::Shader(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Shader(s) => match s.program {
                ShaderProgram::Wave => "shader:wave",
                ShaderProgram::Displace => "shader:displace",
            },
            Self::Standard(_) => "standard",
        }
    }
}
