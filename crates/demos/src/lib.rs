//! Demo scenes and the runtime that drives them.
//!
//! Each demo builds its scene on a [`SceneHost`](shaderbox_scene::SceneHost),
//! registers its parameters, and reacts to asset completions. The
//! [`DemoRuntime`] ties a demo to a clock, a frame driver and a parameter
//! panel; the desktop app and [`run_headless`] both go through it.
//!
//! # Invariants
//! - Parameter callbacks write scene state only; they never touch the driver.
//! - Objects that depend on an asset are added when its completion is
//!   drained, never earlier.
//! - The lamps panel is built once, after the first successful model load.

mod demo;
mod headless;
mod lamps;
mod runtime;
mod terrain;
mod wave_cube;

pub use demo::{Demo, DemoError, DemoKind};
pub use headless::{HeadlessReport, InlineLoader, run_headless};
pub use lamps::Lamps;
pub use runtime::DemoRuntime;
pub use terrain::Terrain;
pub use wave_cube::WaveCube;

use shaderbox_common::ObjectId;
use shaderbox_params::{ParamError, ParamValue, ParameterPanel};
use shaderbox_scene::{Scene, ShaderUniforms};

/// Wires `name` to one shader object's uniforms.
fn bind_uniform<F>(
    panel: &mut ParameterPanel<Scene>,
    name: &str,
    object: ObjectId,
    apply: F,
) -> Result<(), ParamError>
where
    F: Fn(&mut ShaderUniforms, &ParamValue) + 'static,
{
    panel.on_change(name, move |value, scene| {
        if let Some(uniforms) = scene.shader_uniforms_mut(object) {
            apply(uniforms, value);
        }
    })
}
