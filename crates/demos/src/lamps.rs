use glam::Vec3;
use shaderbox_assets::{Asset, AssetEvent, AssetId, AssetKind, ModelData};
use shaderbox_common::{Color, ObjectId, Transform};
use shaderbox_frame::Animation;
use shaderbox_params::{
    DeferredSetup, ParamError, ParamKind, ParamValue, ParameterPanel, ScalarRange,
};
use shaderbox_scene::{
    Geometry, Material, MaterialTable, PointLight, RenderBackend, Scene, SceneHost, SceneObject,
    StandardMaterial, instantiate_model,
};

use crate::DemoError;

pub const LAMP_COLOR: &str = "Lamp Color";
pub const LAMP_INTENSITY: &str = "Lamp Intensity";
pub const BACKGROUND: &str = "Background";

pub const MODEL_PATH: &str = "lamp.glb";
pub const LAMP_COUNT: usize = 5;

const LAMP_SPACING: f32 = 2.0;
/// Bulb position for models that ship without a punctual light.
const FALLBACK_BULB: Vec3 = Vec3::new(0.0, 1.2, 0.0);
const INITIAL_LAMP_COLOR: Color = Color::from_hex(0xffd27f);
const INITIAL_INTENSITY: f32 = 2.0;
const INITIAL_BACKGROUND: Color = Color::from_hex(0x101018);

const MATERIALS: &str = include_str!("../data/lamp_materials.json");

/// A row of lamps sharing one color control.
///
/// Nothing lamp-related exists until the model has loaded; the panel is
/// built right after the first successful load.
#[derive(Debug)]
pub struct Lamps {
    model: Option<AssetId>,
    table: MaterialTable,
    lights: Vec<ObjectId>,
    panel_setup: DeferredSetup,
}

impl Default for Lamps {
    fn default() -> Self {
        Self::new()
    }
}

impl Lamps {
    pub fn new() -> Self {
        let table = MaterialTable::from_json(MATERIALS).unwrap_or_else(|error| {
            tracing::warn!(%error, "built-in lamp materials unreadable, using defaults");
            MaterialTable::default()
        });
        Self {
            model: None,
            table,
            lights: Vec::new(),
            panel_setup: DeferredSetup::new(),
        }
    }

    pub fn lights(&self) -> &[ObjectId] {
        &self.lights
    }

    pub fn panel_built(&self) -> bool {
        self.panel_setup.is_done()
    }

    pub(crate) fn setup<R: RenderBackend>(
        &mut self,
        host: &mut SceneHost<R>,
        _panel: &mut ParameterPanel<Scene>,
    ) -> Result<Vec<Animation>, DemoError> {
        let scene = host.scene_mut();
        scene.background = INITIAL_BACKGROUND;
        scene.ambient = Color::new(0.05, 0.05, 0.07);
        host.add(SceneObject::mesh(
            "ground",
            Geometry::Plane {
                width: 20.0,
                depth: 20.0,
                segments: 1,
            },
            Material::Standard(StandardMaterial {
                color: Color::from_hex(0x303030),
                roughness: 0.9,
                ..StandardMaterial::default()
            }),
        ));
        let camera = host.camera_mut();
        camera.position = Vec3::new(0.0, 3.0, 9.0);
        camera.target = Vec3::new(0.0, 1.0, 0.0);

        self.model = Some(host.request_asset(AssetKind::Model, MODEL_PATH));
        Ok(Vec::new())
    }

    pub(crate) fn on_asset(
        &mut self,
        event: &AssetEvent,
        scene: &mut Scene,
        panel: &mut ParameterPanel<Scene>,
    ) {
        let AssetEvent::Loaded {
            request,
            asset: Asset::Model(model),
        } = event
        else {
            return;
        };
        if Some(request.id) != self.model {
            return;
        }
        if self.panel_setup.is_done() {
            tracing::debug!("lamp model already placed, ignoring reload");
            return;
        }

        self.place_lamps(scene, model);
        let lights = self.lights.clone();
        let built = self.panel_setup.run(|| {
            build_panel(panel, lights)?;
            panel.sync(scene);
            Ok::<(), ParamError>(())
        });
        match built {
            Some(Ok(())) => tracing::info!(lights = self.lights.len(), "lamp panel ready"),
            Some(Err(error)) => tracing::warn!(%error, "lamp panel incomplete"),
            None => {}
        }
    }

    fn place_lamps(&mut self, scene: &mut Scene, model: &ModelData) {
        let table = match self.table.validate(model) {
            Ok(()) => self.table.clone(),
            Err(error) => {
                tracing::warn!(%error, "lamp material table does not fit model, using fallback");
                MaterialTable {
                    fallback: self.table.fallback.clone(),
                    ..MaterialTable::default()
                }
            }
        };
        let first = -(LAMP_COUNT as f32 - 1.0) * 0.5 * LAMP_SPACING;
        for i in 0..LAMP_COUNT {
            let x = first + i as f32 * LAMP_SPACING;
            let transform = Transform::from_position(Vec3::new(x, 0.0, 0.0));
            let instance =
                match instantiate_model(scene, &format!("lamp_{i}"), model, &table, transform) {
                    Ok(instance) => instance,
                    Err(error) => {
                        tracing::warn!(%error, lamp = i, "could not place lamp");
                        continue;
                    }
                };
            if instance.lights.is_empty() {
                let bulb = scene.add(
                    SceneObject::point_light(format!("lamp_{i}_bulb"), PointLight::default())
                        .with_transform(Transform::from_position(FALLBACK_BULB))
                        .with_parent(instance.root),
                );
                self.lights.push(bulb);
            } else {
                self.lights.extend(instance.lights);
            }
        }
    }
}

fn build_panel(panel: &mut ParameterPanel<Scene>, lights: Vec<ObjectId>) -> Result<(), ParamError> {
    let lamps = panel.add_group("Lamps")?;
    let world = panel.add_group("Scene")?;

    panel.register_in(
        lamps,
        LAMP_COLOR,
        ParamValue::Color(INITIAL_LAMP_COLOR),
        ParamKind::Color,
    )?;
    panel.register_in(
        lamps,
        LAMP_INTENSITY,
        ParamValue::Scalar(INITIAL_INTENSITY),
        ParamKind::Scalar,
    )?;
    panel.set_range(LAMP_INTENSITY, ScalarRange::new(0.0, 10.0).with_step(0.1))?;
    panel.register_in(
        world,
        BACKGROUND,
        ParamValue::Color(INITIAL_BACKGROUND),
        ParamKind::Color,
    )?;

    let color_targets = lights.clone();
    panel.on_change(LAMP_COLOR, move |value, scene| {
        let Some(color) = value.as_color() else {
            return;
        };
        for id in &color_targets {
            if let Some(light) = scene.light_mut(*id) {
                light.color = color;
            }
        }
    })?;
    panel.on_change(LAMP_INTENSITY, move |value, scene| {
        let Some(intensity) = value.as_scalar() else {
            return;
        };
        for id in &lights {
            if let Some(light) = scene.light_mut(*id) {
                light.intensity = intensity;
            }
        }
    })?;
    panel.on_change(BACKGROUND, |value, scene| {
        if let Some(color) = value.as_color() {
            scene.background = color;
        }
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use shaderbox_assets::{AssetError, AssetLoader, AssetOutbox, AssetRequest, ModelMesh};
    use shaderbox_common::{MeshData, Viewport};
    use shaderbox_scene::DebugTextRenderer;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct HeldLoader {
        held: Rc<RefCell<Vec<(AssetRequest, AssetOutbox)>>>,
    }

    impl AssetLoader for HeldLoader {
        fn load(&self, request: AssetRequest, outbox: AssetOutbox) {
            self.held.borrow_mut().push((request, outbox));
        }
    }

    impl HeldLoader {
        fn answer(&self, asset: Asset) {
            let (request, outbox) = self.held.borrow()[0].clone();
            outbox.deliver(AssetEvent::Loaded { request, asset });
        }

        fn fail(&self) {
            let (request, outbox) = self.held.borrow()[0].clone();
            outbox.deliver(AssetEvent::Failed {
                request,
                error: AssetError::Unsupported("truncated glb".into()),
            });
        }
    }

    fn lamp_model() -> Asset {
        Asset::Model(Arc::new(ModelData {
            meshes: vec![
                ModelMesh {
                    id: "Stand".into(),
                    mesh: Arc::new(MeshData::default()),
                    transform: Mat4::IDENTITY,
                },
                ModelMesh {
                    id: "Shade".into(),
                    mesh: Arc::new(MeshData::default()),
                    transform: Mat4::IDENTITY,
                },
            ],
            lights: Vec::new(),
        }))
    }

    struct Fixture {
        loader: HeldLoader,
        host: SceneHost<DebugTextRenderer>,
        panel: ParameterPanel<Scene>,
        demo: Lamps,
    }

    impl Fixture {
        fn new() -> Self {
            let loader = HeldLoader::default();
            let mut host = SceneHost::new(
                DebugTextRenderer::new(),
                Viewport::default(),
                Box::new(loader.clone()),
            );
            let mut panel = ParameterPanel::new();
            let mut demo = Lamps::new();
            demo.setup(&mut host, &mut panel).unwrap();
            Self {
                loader,
                host,
                panel,
                demo,
            }
        }

        fn drain(&mut self) {
            for event in self.host.poll_assets() {
                self.demo
                    .on_asset(&event, self.host.scene_mut(), &mut self.panel);
            }
        }
    }

    #[test]
    fn nothing_before_model_arrives() {
        let mut f = Fixture::new();
        f.drain();
        assert!(f.panel.is_empty());
        assert!(!f.demo.panel_built());
        assert_eq!(f.host.scene().len(), 1);
        f.host.render().unwrap();
    }

    #[test]
    fn model_load_places_five_lamps_and_builds_panel() {
        let mut f = Fixture::new();
        f.loader.answer(lamp_model());
        f.drain();

        assert!(f.demo.panel_built());
        assert_eq!(f.demo.lights().len(), LAMP_COUNT);
        assert_eq!(f.panel.len(), 3);
        assert_eq!(f.panel.groups().count(), 2);
        for id in f.demo.lights() {
            let light = f.host.scene().get(*id).unwrap().as_light().unwrap();
            assert_eq!(light.color, INITIAL_LAMP_COLOR);
            assert_eq!(light.intensity, INITIAL_INTENSITY);
        }
    }

    #[test]
    fn one_color_change_reaches_all_five_lights() {
        let mut f = Fixture::new();
        f.loader.answer(lamp_model());
        f.drain();

        let teal = Color::from_hex(0x00c0c0);
        f.panel
            .set(LAMP_COLOR, ParamValue::Color(teal), f.host.scene_mut())
            .unwrap();
        let colors: Vec<Color> = f
            .demo
            .lights()
            .iter()
            .map(|id| f.host.scene().get(*id).unwrap().as_light().unwrap().color)
            .collect();
        assert_eq!(colors, vec![teal; LAMP_COUNT]);
    }

    #[test]
    fn second_load_builds_nothing_new() {
        let mut f = Fixture::new();
        f.loader.answer(lamp_model());
        f.drain();
        let objects = f.host.scene().len();

        f.loader.answer(lamp_model());
        f.drain();
        assert_eq!(f.host.scene().len(), objects);
        assert_eq!(f.panel.len(), 3);
    }

    #[test]
    fn failed_load_leaves_scene_and_panel_empty() {
        let mut f = Fixture::new();
        f.loader.fail();
        f.drain();
        assert!(f.panel.is_empty());
        assert_eq!(f.host.scene().len(), 1);
        assert!(f.demo.lights().is_empty());
    }

    #[test]
    fn shade_uses_table_material() {
        let mut f = Fixture::new();
        f.loader.answer(lamp_model());
        f.drain();
        let shade = f.host.scene().find("Shade").unwrap();
        let mesh = f.host.scene().get(shade).unwrap().as_mesh().unwrap();
        match &mesh.material {
            Material::Standard(m) => assert_eq!(m.emissive, Color::from_hex(0xffd27f)),
            other => panic!("unexpected material {other:?}"),
        }
    }
}
