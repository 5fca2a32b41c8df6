use glam::Vec3;
use shaderbox_common::ObjectId;
use shaderbox_scene::{RenderBackend, RenderError, Scene, SceneHost};
use std::time::Instant;

use crate::clock::Clock;
use crate::scheduler::{FrameRequest, FrameScheduler};
use crate::timer::FrameTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Running,
}

/// Per-tick update applied before rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    /// Adds `delta` radians to the object's Euler rotation every tick.
    Spin { object: ObjectId, delta: Vec3 },
    /// Writes clock seconds into the object's shader `time` uniform.
    ElapsedUniform { object: ObjectId },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("animated object {0:?} is not in the scene")]
    MissingObject(ObjectId),
    #[error("object {0:?} has no shader uniforms")]
    NotAShaderMesh(ObjectId),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// What happened to a fired frame request.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Rendered,
    /// Part of the body failed; the next frame is already scheduled. The
    /// other animations and the render still ran.
    Faulted(FrameError),
    /// The request was cancelled or superseded; nothing ran.
    Skipped,
}

/// Per-frame callback loop.
///
/// Holds at most one live [`FrameRequest`]. Each executed tick re-requests
/// the next frame before doing any work, so a failing body never stops
/// the loop.
#[derive(Debug)]
pub struct AnimationDriver<S> {
    scheduler: S,
    state: DriverState,
    pending: Option<FrameRequest>,
    animations: Vec<Animation>,
    frames_run: u64,
    timer: FrameTimer,
}

impl<S: FrameScheduler> AnimationDriver<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: DriverState::Stopped,
            pending: None,
            animations: Vec::new(),
            frames_run: 0,
            timer: FrameTimer::new(),
        }
    }

    pub fn animate(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    /// Schedules the first frame. No-op while running.
    pub fn start(&mut self) {
        if self.state == DriverState::Running {
            return;
        }
        self.state = DriverState::Running;
        self.pending = Some(self.scheduler.request_frame());
        tracing::info!("animation started");
    }

    /// Cancels the pending frame. No-op while stopped.
    pub fn pause(&mut self) {
        if self.state == DriverState::Stopped {
            return;
        }
        self.state = DriverState::Stopped;
        if let Some(request) = self.pending.take() {
            self.scheduler.cancel_frame(request);
        }
        tracing::info!(frames = self.frames_run, "animation paused");
    }

    pub fn toggle(&mut self) {
        match self.state {
            DriverState::Running => self.pause(),
            DriverState::Stopped => self.start(),
        }
    }

    /// Runs one tick for `fired`.
    pub fn frame<R: RenderBackend>(
        &mut self,
        fired: FrameRequest,
        host: &mut SceneHost<R>,
        clock: &Clock,
    ) -> FrameOutcome {
        if self.pending != Some(fired) {
            tracing::trace!(request = fired.raw(), "skipping stale frame request");
            return FrameOutcome::Skipped;
        }
        let _span = tracing::trace_span!("frame", n = self.frames_run).entered();
        let frame_start = Instant::now();

        self.pending = match self.state {
            DriverState::Running => Some(self.scheduler.request_frame()),
            DriverState::Stopped => None,
        };

        let elapsed = clock.elapsed_seconds();
        let animated = self.apply(host.scene_mut(), elapsed);
        let rendered = host.render().map_err(FrameError::from);
        let result = animated.and(rendered);

        self.frames_run += 1;
        self.timer.record(frame_start.elapsed());
        match result {
            Ok(()) => {
                tracing::trace!(elapsed, "frame rendered");
                FrameOutcome::Rendered
            }
            Err(error) => {
                tracing::warn!(%error, "frame failed");
                FrameOutcome::Faulted(error)
            }
        }
    }

    /// Runs every animation, even after one fails. Returns the first
    /// failure.
    fn apply(&self, scene: &mut Scene, elapsed: f64) -> Result<(), FrameError> {
        let mut first = Ok(());
        for animation in &self.animations {
            if let Err(error) = Self::step(animation, scene, elapsed) {
                tracing::debug!(%error, ?animation, "animation step failed");
                if first.is_ok() {
                    first = Err(error);
                }
            }
        }
        first
    }

    fn step(animation: &Animation, scene: &mut Scene, elapsed: f64) -> Result<(), FrameError> {
        match *animation {
            Animation::Spin { object, delta } => {
                let target = scene
                    .get_mut(object)
                    .ok_or(FrameError::MissingObject(object))?;
                target.transform.rotation += delta;
            }
            Animation::ElapsedUniform { object } => {
                if !scene.contains(object) {
                    return Err(FrameError::MissingObject(object));
                }
                let uniforms = scene
                    .shader_uniforms_mut(object)
                    .ok_or(FrameError::NotAShaderMesh(object))?;
                uniforms.time = elapsed as f32;
            }
        }
        Ok(())
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
