use glam::Vec2;
use shaderbox_assets::{
    AssetEvent, AssetId, AssetInbox, AssetKind, AssetLoader, AssetOutbox, AssetRequest,
    AssetStatus, AssetTracker, asset_channel,
};
use shaderbox_common::{ObjectId, Viewport};
use std::path::PathBuf;

use crate::camera::Camera;
use crate::error::RenderError;
use crate::object::SceneObject;
use crate::renderer::RenderBackend;
use crate::scene::Scene;

/// Owns the render backend, camera, viewport and scene graph.
///
/// Asset completions are posted by the loader onto the host's inbox and
/// applied only when [`SceneHost::poll_assets`] is called on the control
/// thread.
pub struct SceneHost<R> {
    backend: R,
    scene: Scene,
    camera: Camera,
    viewport: Viewport,
    loader: Box<dyn AssetLoader>,
    outbox: AssetOutbox,
    inbox: AssetInbox,
    tracker: AssetTracker,
}

impl<R: RenderBackend> SceneHost<R> {
    pub fn new(mut backend: R, viewport: Viewport, loader: Box<dyn AssetLoader>) -> Self {
        let viewport = Viewport::new(viewport.width, viewport.height);
        let camera = Camera {
            aspect: viewport.aspect(),
            ..Camera::default()
        };
        backend.resize(viewport);
        let (outbox, inbox) = asset_channel();
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            "scene host ready"
        );
        Self {
            backend,
            scene: Scene::new(),
            camera,
            viewport,
            loader,
            outbox,
            inbox,
            tracker: AssetTracker::new(),
        }
    }

    /// Applies new surface dimensions. Returns `false` (and does nothing)
    /// when they match the current viewport.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
        let resolution = Vec2::new(viewport.width as f32, viewport.height as f32);
        self.scene.for_each_shader(|u| u.resolution = resolution);
        self.backend.resize(viewport);
        tracing::debug!(width, height, aspect = self.camera.aspect, "viewport resized");
        true
    }

    pub fn render(&mut self) -> Result<(), RenderError> {
        self.backend.render(&self.scene, &self.camera)
    }

    /// Appends an object. Shader uniforms pick up the current resolution.
    pub fn add(&mut self, mut object: SceneObject) -> ObjectId {
        if let Some(uniforms) = object.uniforms_mut() {
            uniforms.resolution =
                Vec2::new(self.viewport.width as f32, self.viewport.height as f32);
        }
        self.scene.add(object)
    }

    /// Starts an asynchronous load. The result shows up in a later
    /// [`SceneHost::poll_assets`].
    pub fn request_asset(&mut self, kind: AssetKind, path: impl Into<PathBuf>) -> AssetId {
        let request = AssetRequest::new(kind, path);
        let id = request.id;
        tracing::debug!(%id, path = %request.path.display(), ?kind, "asset requested");
        self.tracker.begin(id);
        self.loader.load(request, self.outbox.clone());
        id
    }

    /// Drains completed loads, updating the tracker. Failures are logged
    /// and returned alongside successes so callers can react to both.
    /// Completions for assets this host never requested are dropped.
    pub fn poll_assets(&mut self) -> Vec<AssetEvent> {
        let mut events = self.inbox.drain();
        events.retain(|event| {
            let requested = self.tracker.observe(event);
            if !requested {
                tracing::debug!(id = %event.id(), "ignoring unrequested asset");
            }
            requested
        });
        for event in &events {
            match event {
                AssetEvent::Loaded { request, asset } => {
                    tracing::info!(path = %request.path.display(), kind = asset.kind_name(), "asset ready");
                }
                AssetEvent::Failed { request, error } => {
                    tracing::warn!(path = %request.path.display(), %error, "asset unavailable");
                }
            }
        }
        events
    }

    pub fn asset_status(&self, id: AssetId) -> Option<&AssetStatus> {
        self.tracker.status(id)
    }

    pub fn pending_assets(&self) -> usize {
        self.tracker.pending_count()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn backend(&self) -> &R {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut R {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::material::{Material, ShaderMaterial, ShaderProgram, ShaderUniforms};
    use crate::renderer::DebugTextRenderer;
    use shaderbox_assets::AssetError;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Accepts requests and never answers.
    struct NeverLoader;

    impl AssetLoader for NeverLoader {
        fn load(&self, _request: AssetRequest, _outbox: AssetOutbox) {}
    }

    /// Keeps outboxes so a test can answer later.
    #[derive(Clone, Default)]
    struct HeldLoader {
        held: Rc<RefCell<Vec<(AssetRequest, AssetOutbox)>>>,
    }

    impl AssetLoader for HeldLoader {
        fn load(&self, request: AssetRequest, outbox: AssetOutbox) {
            self.held.borrow_mut().push((request, outbox));
        }
    }

    fn host_with(loader: Box<dyn AssetLoader>) -> SceneHost<DebugTextRenderer> {
        SceneHost::new(DebugTextRenderer::new(), Viewport::new(800, 600), loader)
    }

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
    fn resize_sets_aspect_and_is_idempotent() {
        let mut host = host_with(Box::new(NeverLoader));
        assert_eq!(host.backend().resizes().len(), 1);

        assert!(host.resize(1920, 1080));
        assert!((host.camera().aspect - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(host.backend().resizes().len(), 2);

        assert!(!host.resize(1920, 1080));
        assert_eq!(host.backend().resizes().len(), 2);
    }

    #[test]
    fn resize_updates_shader_resolution() {
        let mut host = host_with(Box::new(NeverLoader));
        let id = host.add(cube());
        assert_eq!(
            host.scene_mut().shader_uniforms_mut(id).unwrap().resolution,
            Vec2::new(800.0, 600.0)
        );
        host.resize(1024, 512);
        assert_eq!(
            host.scene_mut().shader_uniforms_mut(id).unwrap().resolution,
            Vec2::new(1024.0, 512.0)
        );
    }

    #[test]
    fn zero_size_resize_is_clamped() {
        let mut host = host_with(Box::new(NeverLoader));
        host.resize(0, 0);
        assert_eq!(host.viewport(), Viewport::new(1, 1));
        assert_eq!(host.camera().aspect, 1.0);
    }

    #[test]
    fn unresolved_load_leaves_render_callable() {
        let mut host = host_with(Box::new(NeverLoader));
        host.add(cube());
        let id = host.request_asset(AssetKind::Model, "lamp.glb");

        for _ in 0..3 {
            assert!(host.poll_assets().is_empty());
            host.render().unwrap();
        }
        assert_eq!(host.scene().len(), 1);
        assert_eq!(host.asset_status(id), Some(&AssetStatus::Pending));
        assert_eq!(host.backend().frames(), 3);
    }

    #[test]
    fn failed_load_marks_unavailable_and_leaves_scene() {
        let loader = HeldLoader::default();
        let mut host = host_with(Box::new(loader.clone()));
        let id = host.request_asset(AssetKind::Texture, "texture.jpeg");

        let (request, outbox) = loader.held.borrow_mut().remove(0);
        assert!(outbox.deliver(AssetEvent::Failed {
            request,
            error: AssetError::Unsupported("corrupt".into()),
        }));

        let events = host.poll_assets();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            host.asset_status(id),
            Some(AssetStatus::Unavailable(_))
        ));
        assert!(host.scene().is_empty());
        assert_eq!(host.pending_assets(), 0);
        host.render().unwrap();
    }

    #[test]
    fn unrequested_completions_are_not_returned() {
        let loader = HeldLoader::default();
        let mut host = host_with(Box::new(loader.clone()));
        let id = host.request_asset(AssetKind::Texture, "texture.jpeg");

        let (request, outbox) = loader.held.borrow_mut().remove(0);
        let stray = AssetRequest::new(AssetKind::Texture, "other.jpeg");
        assert!(outbox.deliver(AssetEvent::Failed {
            request: stray.clone(),
            error: AssetError::Unsupported("stray".into()),
        }));
        assert!(outbox.deliver(AssetEvent::Failed {
            request,
            error: AssetError::Unsupported("corrupt".into()),
        }));

        let events = host.poll_assets();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id(), id);
        assert_eq!(host.asset_status(stray.id), None);
    }

    #[test]
    fn delivery_after_host_dropped_is_discarded() {
        let loader = HeldLoader::default();
        let mut host = host_with(Box::new(loader.clone()));
        host.request_asset(AssetKind::Texture, "texture.jpeg");
        drop(host);

        let (request, outbox) = loader.held.borrow_mut().remove(0);
        assert!(!outbox.deliver(AssetEvent::Failed {
            request,
            error: AssetError::Unsupported("late".into()),
        }));
    }
}
