use shaderbox_frame::{
    AnimationDriver, Clock, ClockError, FrameOutcome, FrameRequest, FrameScheduler,
};
use shaderbox_params::{ParamError, ParamValue, ParameterPanel};
use shaderbox_scene::{RenderBackend, RenderError, Scene, SceneHost};

use crate::demo::{Demo, DemoError, DemoKind};

/// A demo wired to its host, panel, clock and frame driver.
pub struct DemoRuntime<R, S> {
    host: SceneHost<R>,
    panel: ParameterPanel<Scene>,
    driver: AnimationDriver<S>,
    clock: Clock,
    demo: Demo,
}

impl<R: RenderBackend, S: FrameScheduler> DemoRuntime<R, S> {
    /// Builds the demo scene, pushes initial parameter values into it and
    /// schedules the first frame. The clock is started if it is not yet.
    pub fn new(
        kind: DemoKind,
        mut host: SceneHost<R>,
        scheduler: S,
        mut clock: Clock,
    ) -> Result<Self, DemoError> {
        let mut demo = Demo::new(kind);
        let mut panel = ParameterPanel::new();
        let animations = demo.setup(&mut host, &mut panel)?;
        panel.sync(host.scene_mut());

        let mut driver = AnimationDriver::new(scheduler);
        for animation in animations {
            driver.animate(animation);
        }
        if let Err(ClockError::AlreadyStarted) = clock.start() {
            tracing::debug!("clock was already running");
        }
        driver.start();
        tracing::info!(demo = %kind, params = panel.len(), "demo running");
        Ok(Self {
            host,
            panel,
            driver,
            clock,
            demo,
        })
    }

    /// Applies finished asset loads, then runs the frame for `fired`.
    pub fn tick(&mut self, fired: FrameRequest) -> FrameOutcome {
        self.poll_assets();
        self.driver.frame(fired, &mut self.host, &self.clock)
    }

    /// Draws the scene as it is, without advancing animations. Used to keep
    /// the window responsive while paused.
    pub fn redraw_paused(&mut self) -> Result<(), RenderError> {
        self.poll_assets();
        self.host.render()
    }

    pub fn poll_assets(&mut self) {
        for event in self.host.poll_assets() {
            self.demo.on_asset(&event, &mut self.host, &mut self.panel);
        }
    }

    /// GUI change event.
    pub fn set_param(&mut self, name: &str, value: ParamValue) -> Result<ParamValue, ParamError> {
        self.panel.set(name, value, self.host.scene_mut())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.host.resize(width, height)
    }

    pub fn toggle_pause(&mut self) {
        self.driver.toggle();
    }

    pub fn kind(&self) -> DemoKind {
        self.demo.kind()
    }

    pub fn host(&self) -> &SceneHost<R> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut SceneHost<R> {
        &mut self.host
    }

    pub fn panel(&self) -> &ParameterPanel<Scene> {
        &self.panel
    }

    pub fn driver(&self) -> &AnimationDriver<S> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut AnimationDriver<S> {
        &mut self.driver
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wave_cube::{COLOR_2, SPIN_PER_TICK};
    use shaderbox_assets::{AssetLoader, AssetOutbox, AssetRequest};
    use shaderbox_common::{Color, Viewport};
    use shaderbox_frame::{ManualScheduler, ManualTime};
    use shaderbox_scene::DebugTextRenderer;
    use std::time::Duration;

    struct NeverLoader;

    impl AssetLoader for NeverLoader {
        fn load(&self, _request: AssetRequest, _outbox: AssetOutbox) {}
    }

    fn runtime(kind: DemoKind) -> (DemoRuntime<DebugTextRenderer, ManualScheduler>, ManualTime) {
        let time = ManualTime::new();
        let host = SceneHost::new(
            DebugTextRenderer::new(),
            Viewport::default(),
            Box::new(NeverLoader),
        );
        let rt = DemoRuntime::new(kind, host, ManualScheduler::new(), Clock::new(time.clone()))
            .unwrap();
        (rt, time)
    }

    fn step(rt: &mut DemoRuntime<DebugTextRenderer, ManualScheduler>) -> FrameOutcome {
        let fired = rt.driver_mut().scheduler_mut().pop_due().unwrap();
        rt.tick(fired)
    }

    #[test]
    fn every_demo_starts_running() {
        for kind in DemoKind::ALL {
            let (rt, _) = runtime(kind);
            assert!(rt.driver().is_running());
            assert!(rt.clock().is_running());
            assert_eq!(rt.kind(), kind);
        }
    }

    #[test]
    fn wave_cube_spins_and_tracks_time() {
        let (mut rt, time) = runtime(DemoKind::WaveCube);
        for _ in 0..10 {
            time.advance(Duration::from_millis(16));
            assert_eq!(step(&mut rt), FrameOutcome::Rendered);
        }
        let cube = rt.host().scene().find("cube").unwrap();
        let rotation = rt.host().scene().get(cube).unwrap().transform.rotation;
        assert!((rotation.x - 10.0 * SPIN_PER_TICK).abs() < 1e-6);
        assert!(rt.host().backend().last_frame().contains("time=0.160"));
    }

    #[test]
    fn set_param_applies_before_next_frame() {
        let (mut rt, _) = runtime(DemoKind::WaveCube);
        let white = Color::WHITE;
        rt.set_param(COLOR_2, ParamValue::Color(white)).unwrap();
        step(&mut rt);
        assert!(rt.host().backend().last_frame().contains("color2=#ffffff"));
    }

    #[test]
    fn paused_runtime_still_redraws() {
        let (mut rt, _) = runtime(DemoKind::Terrain);
        rt.toggle_pause();
        assert!(!rt.driver().is_running());
        rt.redraw_paused().unwrap();
        assert_eq!(rt.host().backend().frames(), 1);
        assert_eq!(rt.driver().scheduler().live(), 0);
    }
}
