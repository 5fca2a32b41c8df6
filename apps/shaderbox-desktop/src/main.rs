mod scheduler;
mod ui;

use anyhow::{Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use shaderbox_assets::FileLoader;
use shaderbox_common::Viewport;
use shaderbox_demos::{DemoKind, DemoRuntime, run_headless};
use shaderbox_frame::{Clock, FrameOutcome, MonotonicTime};
use shaderbox_render_wgpu::WgpuBackend;
use shaderbox_scene::{OrbitControls, SceneHost};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use scheduler::RedrawScheduler;
use ui::{HudStats, draw_ui};

#[derive(Parser)]
#[command(name = "shaderbox-desktop", about = "Interactive shader and lighting demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Demo to run: wave-cube, lamps or terrain
    #[arg(long, default_value = "wave-cube")]
    demo: DemoKind,

    /// Directory holding texture.jpeg, lamp.glb and environment.hdr
    #[arg(long, default_value = "./assets")]
    assets: PathBuf,

    /// Run against the text renderer and print the last frame
    #[arg(long)]
    headless: bool,

    /// Frames to run in headless mode
    #[arg(long, default_value_t = 120)]
    frames: u64,
}

type Runtime = DemoRuntime<WgpuBackend, RedrawScheduler>;

/// Pointer state for orbiting the camera.
#[derive(Default)]
struct Pointer {
    dragging: bool,
    last: Option<PhysicalPosition<f64>>,
}

struct GpuApp {
    demo: DemoKind,
    assets: PathBuf,
    window: Option<Arc<Window>>,
    runtime: Option<Runtime>,
    orbit: Option<OrbitControls>,
    pointer: Pointer,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    fatal: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(demo: DemoKind, assets: PathBuf) -> Self {
        Self {
            demo,
            assets,
            window: None,
            runtime: None,
            orbit: None,
            pointer: Pointer::default(),
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(format!("shaderbox: {}", self.demo.title()))
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();
        let viewport = Viewport::new(size.width, size.height);

        let backend = WgpuBackend::new(window.clone(), viewport)?;
        let egui_renderer =
            egui_wgpu::Renderer::new(backend.device(), backend.surface_format(), None, 1, false);
        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let host = SceneHost::new(backend, viewport, Box::new(FileLoader::new(&self.assets)));
        let redraw_window = window.clone();
        let scheduler = RedrawScheduler::new(move || redraw_window.request_redraw());
        let clock = Clock::new(MonotonicTime::new());
        let runtime = DemoRuntime::new(self.demo, host, scheduler, clock)?;

        self.orbit = Some(OrbitControls::from_camera(runtime.host().camera()));
        self.runtime = Some(runtime);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        self.window = Some(window);
        Ok(())
    }

    /// Redraws on demand while the driver is not scheduling frames.
    fn request_idle_redraw(&self) {
        let paused = self
            .runtime
            .as_ref()
            .is_some_and(|rt| !rt.driver().is_running());
        if let (true, Some(window)) = (paused, &self.window) {
            window.request_redraw();
        }
    }

    fn update_orbit(&mut self, f: impl FnOnce(&mut OrbitControls)) {
        let (Some(orbit), Some(runtime)) = (&mut self.orbit, &mut self.runtime) else {
            return;
        };
        f(orbit);
        orbit.apply(runtime.host_mut().camera_mut());
        self.request_idle_redraw();
    }

    fn redraw(&mut self) {
        let (Some(runtime), Some(window)) = (&mut self.runtime, &self.window) else {
            return;
        };

        match runtime.driver_mut().scheduler_mut().fire() {
            Some(fired) => {
                if let FrameOutcome::Skipped = runtime.tick(fired) {
                    tracing::trace!("stale redraw skipped");
                }
            }
            None => {
                if let Err(error) = runtime.redraw_paused() {
                    tracing::warn!(%error, "paused redraw failed");
                }
            }
        }

        let (Some(egui_winit), Some(egui_renderer)) =
            (&mut self.egui_winit, &mut self.egui_renderer)
        else {
            return;
        };
        let raw_input = egui_winit.take_egui_input(window);
        let stats = HudStats {
            title: runtime.kind().title(),
            fps: runtime.driver().timer().fps(),
            running: runtime.driver().is_running(),
            pending_assets: runtime.host().pending_assets(),
        };
        let mut actions = None;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            actions = Some(draw_ui(ctx, runtime.panel(), &stats));
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        if let Some(actions) = actions {
            for (name, value) in actions.changes {
                if let Err(error) = runtime.set_param(&name, value) {
                    tracing::warn!(%error, "parameter change rejected");
                }
            }
            if actions.toggle_pause {
                runtime.toggle_pause();
            }
        }

        let frame = runtime.host_mut().backend_mut().take_frame();
        let backend = runtime.host().backend();
        let (device, queue) = (backend.device(), backend.queue());
        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let Some(frame) = frame else {
            return;
        };
        let size = backend.size();
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: frame.view(),
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }
        frame.present();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.fatal.is_some() {
            return;
        }
        if let Err(error) = self.init(event_loop) {
            tracing::error!(%error, "start-up failed");
            self.fatal = Some(error);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.repaint {
                self.request_idle_redraw();
            }
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(runtime) = &mut self.runtime {
                    runtime.resize(new_size.width, new_size.height);
                }
                self.request_idle_redraw();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key {
                KeyCode::Space => {
                    if let Some(runtime) = &mut self.runtime {
                        runtime.toggle_pause();
                        tracing::info!(running = runtime.driver().is_running(), "pause toggled");
                    }
                    self.request_idle_redraw();
                }
                KeyCode::Escape => event_loop.exit(),
                _ => {}
            },
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.pointer.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let last = self.pointer.last.replace(position);
                if let (true, Some(last)) = (self.pointer.dragging, last) {
                    let (dx, dy) = ((position.x - last.x) as f32, (position.y - last.y) as f32);
                    self.update_orbit(|orbit| orbit.rotate(dx, dy));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.update_orbit(|orbit| orbit.zoom(amount));
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Outstanding loads are polled from redraws, paused or not.
        let loading = self
            .runtime
            .as_ref()
            .is_some_and(|rt| rt.host().pending_assets() > 0);
        if loading {
            self.request_idle_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    if cli.headless {
        let report = run_headless(cli.demo, &cli.assets, cli.frames, Duration::from_millis(16))?;
        println!(
            "{}: rendered={} faulted={} pending_assets={} parameters={}",
            report.demo, report.rendered, report.faulted, report.pending_assets, report.parameters
        );
        println!("{}", report.last_frame);
        return Ok(());
    }

    tracing::info!(demo = %cli.demo, assets = %cli.assets.display(), "shaderbox-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GpuApp::new(cli.demo, cli.assets);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(error) => Err(anyhow!("shaderbox-desktop could not start: {error:#}")),
        None => Ok(()),
    }
}
