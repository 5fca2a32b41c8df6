use shaderbox_common::Viewport;
use std::fmt::Write as _;

use crate::camera::Camera;
use crate::error::RenderError;
use crate::material::Material;
use crate::object::ObjectKind;
use crate::scene::Scene;

/// Renderer-agnostic interface. All backends implement this trait.
///
/// A backend reads the scene and camera and draws one frame. It never
/// mutates the scene.
pub trait RenderBackend {
    /// Reconfigures output size. Only called when dimensions change.
    fn resize(&mut self, viewport: Viewport);

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError>;
}

/// Text backend for tests and headless runs.
///
/// Each frame is formatted into a string; the most recent one is kept.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
    resizes: Vec<Viewport>,
    last: String,
    fail_frames: u32,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` renders fail with a backend error.
    pub fn fail_next(&mut self, count: u32) {
        self.fail_frames = count;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn resizes(&self) -> &[Viewport] {
        &self.resizes
    }

    pub fn last_frame(&self) -> &str {
        &self.last
    }
}

impl RenderBackend for DebugTextRenderer {
    fn resize(&mut self, viewport: Viewport) {
        self.resizes.push(viewport);
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
        if self.fail_frames > 0 {
            self.fail_frames -= 1;
            return Err(RenderError::Backend("injected failure".into()));
        }
        self.frames += 1;

        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "=== frame {} ({} objects) ===",
            self.frames,
            scene.len()
        );
        let p = camera.position;
        let _ = writeln!(
            out,
            "camera: pos=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.3}",
            p.x, p.y, p.z, camera.fov_degrees, camera.aspect
        );
        if scene.environment.is_some() {
            let shown = if scene.show_environment { "shown" } else { "hidden" };
            let _ = writeln!(out, "environment: loaded, {shown}");
        }
        for (id, object) in scene.iter() {
            if !object.visible {
                continue;
            }
            let r = object.transform.rotation;
            let _ = write!(
                out,
                "  [{}] {} rot=({:.3}, {:.3}, {:.3})",
                id.short(),
                object.name,
                r.x,
                r.y,
                r.z
            );
            match &object.kind {
                ObjectKind::Mesh(mesh) => {
                    let _ = write!(
                        out,
                        " mesh={} material={}",
                        mesh.geometry.label(),
                        mesh.material.label()
                    );
                    if let Material::Shader(shader) = &mesh.material {
                        let u = &shader.uniforms;
                        let _ = write!(
                            out,
                            " time={:.3} wave={:.2} color1={} color2={} texture={}",
                            u.time,
                            u.wave,
                            u.color1,
                            u.color2,
                            if u.texture.is_some() { "ready" } else { "none" }
                        );
                    }
                }
                ObjectKind::PointLight(light) => {
                    let _ = write!(
                        out,
                        " light color={} intensity={:.2}",
                        light.color, light.intensity
                    );
                }
                ObjectKind::Group => {}
            }
            out.push('\n');
        }
        self.last = out;
        Ok(())
    }
}
