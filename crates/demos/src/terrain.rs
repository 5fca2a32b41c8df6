use glam::Vec3;
use shaderbox_assets::{Asset, AssetEvent, AssetId, AssetKind};
use shaderbox_common::{Color, ObjectId};
use shaderbox_frame::Animation;
use shaderbox_params::{ParamKind, ParamValue, ParameterPanel, ScalarRange};
use shaderbox_scene::{
    Geometry, Material, RenderBackend, Scene, SceneHost, SceneObject, ShaderMaterial,
    ShaderProgram, ShaderUniforms,
};

use crate::DemoError;
use crate::bind_uniform;

pub const WAVE_FREQ: &str = "Wave Freq";
pub const AMPLITUDE: &str = "Amplitude";
pub const LOW_COLOR: &str = "Low Color";
pub const HIGH_COLOR: &str = "High Color";
pub const SHOW_SKY: &str = "Show Sky";

pub const ENVIRONMENT_PATH: &str = "environment.hdr";

const SIZE: f32 = 20.0;
const SEGMENTS: u32 = 128;
const INITIAL_WAVE: f32 = 4.0;
const INITIAL_AMPLITUDE: f32 = 0.6;
const INITIAL_LOW: Color = Color::from_hex(0x2d5a27);
const INITIAL_HIGH: Color = Color::from_hex(0xc2b280);

/// Wave-displaced ground plane under an environment sky.
#[derive(Debug, Default)]
pub struct Terrain {
    ground: Option<ObjectId>,
    environment: Option<AssetId>,
}

impl Terrain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ground(&self) -> Option<ObjectId> {
        self.ground
    }

    pub(crate) fn setup<R: RenderBackend>(
        &mut self,
        host: &mut SceneHost<R>,
        panel: &mut ParameterPanel<Scene>,
    ) -> Result<Vec<Animation>, DemoError> {
        let uniforms = ShaderUniforms {
            wave: INITIAL_WAVE,
            amplitude: INITIAL_AMPLITUDE,
            color1: INITIAL_LOW,
            color2: INITIAL_HIGH,
            ..ShaderUniforms::default()
        };
        let ground = host.add(SceneObject::mesh(
            "terrain",
            Geometry::Plane {
                width: SIZE,
                depth: SIZE,
                segments: SEGMENTS,
            },
            Material::Shader(ShaderMaterial::new(ShaderProgram::Displace, uniforms)),
        ));
        self.ground = Some(ground);
        host.scene_mut().background = Color::from_hex(0x87a9c9);
        let camera = host.camera_mut();
        camera.position = Vec3::new(0.0, 4.0, 8.0);
        camera.target = Vec3::ZERO;
        self.environment = Some(host.request_asset(AssetKind::EnvironmentMap, ENVIRONMENT_PATH));

        let wave = panel.add_group("Wave")?;
        let colors = panel.add_group("Colors")?;
        let sky = panel.add_group("Sky")?;
        panel.register_in(wave, WAVE_FREQ, ParamValue::Scalar(INITIAL_WAVE), ParamKind::Scalar)?;
        panel.set_range(WAVE_FREQ, ScalarRange::new(0.0, 20.0).with_step(0.1))?;
        panel.register_in(
            wave,
            AMPLITUDE,
            ParamValue::Scalar(INITIAL_AMPLITUDE),
            ParamKind::Scalar,
        )?;
        panel.set_range(AMPLITUDE, ScalarRange::new(0.0, 3.0).with_step(0.01))?;
        panel.register_in(colors, LOW_COLOR, ParamValue::Color(INITIAL_LOW), ParamKind::Color)?;
        panel.register_in(colors, HIGH_COLOR, ParamValue::Color(INITIAL_HIGH), ParamKind::Color)?;
        panel.register_in(sky, SHOW_SKY, ParamValue::Bool(true), ParamKind::Bool)?;
        panel.set_collapsed(sky, true)?;

        bind_uniform(panel, WAVE_FREQ, ground, |u, v| {
            if let Some(w) = v.as_scalar() {
                u.wave = w;
            }
        })?;
        bind_uniform(panel, AMPLITUDE, ground, |u, v| {
            if let Some(a) = v.as_scalar() {
                u.amplitude = a;
            }
        })?;
        bind_uniform(panel, LOW_COLOR, ground, |u, v| {
            if let Some(c) = v.as_color() {
                u.color1 = c;
            }
        })?;
        bind_uniform(panel, HIGH_COLOR, ground, |u, v| {
            if let Some(c) = v.as_color() {
                u.color2 = c;
            }
        })?;
        panel.on_change(SHOW_SKY, |value, scene| {
            if let Some(show) = value.as_bool() {
                scene.show_environment = show;
            }
        })?;

        Ok(vec![Animation::ElapsedUniform { object: ground }])
    }

    pub(crate) fn on_asset(&mut self, event: &AssetEvent, scene: &mut Scene) {
        let AssetEvent::Loaded {
            request,
            asset: Asset::Environment(image),
        } = event
        else {
            return;
        };
        if Some(request.id) == self.environment {
            scene.environment = Some(image.clone());
            tracing::debug!(width = image.width, height = image.height, "environment map set");
        }
    }
}
