use glam::Vec3;
use shaderbox_assets::{Asset, AssetEvent, AssetId, AssetKind};
use shaderbox_common::{Color, ObjectId};
use shaderbox_frame::Animation;
use shaderbox_params::{ParamKind, ParamValue, ParameterPanel};
use shaderbox_scene::{
    Geometry, Material, RenderBackend, Scene, SceneHost, SceneObject, ShaderMaterial,
    ShaderProgram, ShaderUniforms,
};

use crate::DemoError;
use crate::bind_uniform;

pub const WAVE_FREQ: &str = "Wave Freq";
pub const COLOR_1: &str = "Color 1";
pub const COLOR_2: &str = "Color 2";

pub const TEXTURE_PATH: &str = "texture.jpeg";
/// Radians added to each rotation axis per tick.
pub const SPIN_PER_TICK: f32 = 0.005;

const CUBE_SIZE: f32 = 3.0;
const INITIAL_WAVE: f32 = 10.0;
const INITIAL_COLOR_1: Color = Color::from_hex(0xc8620e);
const INITIAL_COLOR_2: Color = Color::from_hex(0x810e75);

/// Textured cube with the two-color wave shader, spinning on all axes.
#[derive(Debug, Default)]
pub struct WaveCube {
    cube: Option<ObjectId>,
    texture: Option<AssetId>,
}

impl WaveCube {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cube(&self) -> Option<ObjectId> {
        self.cube
    }

    pub(crate) fn setup<R: RenderBackend>(
        &mut self,
        host: &mut SceneHost<R>,
        panel: &mut ParameterPanel<Scene>,
    ) -> Result<Vec<Animation>, DemoError> {
        let uniforms = ShaderUniforms {
            wave: INITIAL_WAVE,
            color1: INITIAL_COLOR_1,
            color2: INITIAL_COLOR_2,
            ..ShaderUniforms::default()
        };
        let cube = host.add(SceneObject::mesh(
            "cube",
            Geometry::cube(CUBE_SIZE),
            Material::Shader(ShaderMaterial::new(ShaderProgram::Wave, uniforms)),
        ));
        self.cube = Some(cube);
        self.texture = Some(host.request_asset(AssetKind::Texture, TEXTURE_PATH));

        panel.register(WAVE_FREQ, ParamValue::Scalar(INITIAL_WAVE), ParamKind::Scalar)?;
        panel.register(COLOR_1, ParamValue::Color(INITIAL_COLOR_1), ParamKind::Color)?;
        panel.register(COLOR_2, ParamValue::Color(INITIAL_COLOR_2), ParamKind::Color)?;

        bind_uniform(panel, WAVE_FREQ, cube, |u, v| {
            if let Some(w) = v.as_scalar() {
                u.wave = w;
            }
        })?;
        bind_uniform(panel, COLOR_1, cube, |u, v| {
            if let Some(c) = v.as_color() {
                u.color1 = c;
            }
        })?;
        bind_uniform(panel, COLOR_2, cube, |u, v| {
            if let Some(c) = v.as_color() {
                u.color2 = c;
            }
        })?;

        Ok(vec![
            Animation::Spin {
                object: cube,
                delta: Vec3::splat(SPIN_PER_TICK),
            },
            Animation::ElapsedUniform { object: cube },
        ])
    }

    pub(crate) fn on_asset(&mut self, event: &AssetEvent, scene: &mut Scene) {
        let AssetEvent::Loaded {
            request,
            asset: Asset::Texture(image),
        } = event
        else {
            return;
        };
        if Some(request.id) != self.texture {
            return;
        }
        if let Some(uniforms) = self.cube.and_then(|id| scene.shader_uniforms_mut(id)) {
            uniforms.texture = Some(image.clone());
            tracing::debug!(width = image.width, height = image.height, "cube texture bound");
        }
    }
}
