use shaderbox_assets::{AssetEvent, AssetLoader, AssetOutbox, AssetRequest, FileLoader};
use shaderbox_common::Viewport;
use shaderbox_frame::{Clock, FrameOutcome, ManualScheduler, ManualTime};
use shaderbox_scene::{DebugTextRenderer, SceneHost};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::demo::{DemoError, DemoKind};
use crate::runtime::DemoRuntime;

/// Loads on the calling thread and delivers before returning, so a
/// headless run sees every asset by its first frame.
#[derive(Debug, Clone)]
pub struct InlineLoader {
    root: PathBuf,
}

impl InlineLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for InlineLoader {
    fn load(&self, request: AssetRequest, outbox: AssetOutbox) {
        let event = match FileLoader::load_blocking(&self.root, &request) {
            Ok(asset) => AssetEvent::Loaded { request, asset },
            Err(error) => AssetEvent::Failed { request, error },
        };
        outbox.deliver(event);
    }
}

/// Summary of a headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub demo: DemoKind,
    pub rendered: u64,
    pub faulted: u64,
    pub pending_assets: usize,
    pub parameters: usize,
    /// Text of the last rendered frame.
    pub last_frame: String,
}

/// Runs `frames` ticks of a demo against the text backend with simulated
/// time advancing `frame_time` per tick.
pub fn run_headless(
    kind: DemoKind,
    assets: &Path,
    frames: u64,
    frame_time: Duration,
) -> Result<HeadlessReport, DemoError> {
    let _span = tracing::info_span!("headless", demo = %kind, frames).entered();
    let time = ManualTime::new();
    let host = SceneHost::new(
        DebugTextRenderer::new(),
        Viewport::default(),
        Box::new(InlineLoader::new(assets)),
    );
    let mut runtime = DemoRuntime::new(kind, host, ManualScheduler::new(), Clock::new(time.clone()))?;

    let (mut rendered, mut faulted) = (0, 0);
    for _ in 0..frames {
        time.advance(frame_time);
        let Some(fired) = runtime.driver_mut().scheduler_mut().pop_due() else {
            break;
        };
        match runtime.tick(fired) {
            FrameOutcome::Rendered => rendered += 1,
            FrameOutcome::Faulted(_) => faulted += 1,
            FrameOutcome::Skipped => {}
        }
    }

    let host = runtime.host();
    let report = HeadlessReport {
        demo: kind,
        rendered,
        faulted,
        pending_assets: host.pending_assets(),
        parameters: runtime.panel().len(),
        last_frame: host.backend().last_frame().to_string(),
    };
    tracing::info!(rendered, faulted, "headless run finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_assets_still_render_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let report =
            run_headless(DemoKind::WaveCube, dir.path(), 30, Duration::from_millis(16)).unwrap();
        assert_eq!(report.rendered, 30);
        assert_eq!(report.faulted, 0);
        assert_eq!(report.pending_assets, 0);
        assert_eq!(report.parameters, 3);
        assert!(report.last_frame.contains("texture=none"));
    }

    #[test]
    fn lamps_without_model_have_no_panel() {
        let dir = tempfile::tempdir().unwrap();
        let report =
            run_headless(DemoKind::Lamps, dir.path(), 5, Duration::from_millis(16)).unwrap();
        assert_eq!(report.rendered, 5);
        assert_eq!(report.parameters, 0);
        assert!(report.last_frame.contains("ground"));
    }

    #[test]
    fn inline_loader_delivers_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let (outbox, inbox) = shaderbox_assets::asset_channel();
        InlineLoader::new(dir.path()).load(
            AssetRequest::new(shaderbox_assets::AssetKind::Texture, "missing.png"),
            outbox,
        );
        assert!(matches!(inbox.try_next(), Some(AssetEvent::Failed { .. })));
    }
}
