use std::sync::Arc;

use anyhow::Context as _;
use rand::rngs::StdRng;
use rand::SeedableRng;
use vista_core::input::WHEEL_NOTCH;
use vista_core::{FrameClock, InputState, InstanceStore, KeyCode, OrbitCamera, Spin};
use vista_renderer::{CullPath, CullStats, FrameInput};
use winit::{
    application::ApplicationHandler,
    event::{MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::config::AppConfig;
use crate::graphics::GraphicsState;

/// Seconds between window-title refreshes.
const TITLE_INTERVAL: f64 = 0.25;

struct Runner {
    config: AppConfig,
    window: Option<Arc<Window>>,
    graphics: Option<GraphicsState>,
    input: InputState,
    clock: FrameClock,
    spin: Spin,
    camera: OrbitCamera,
    store: InstanceStore,
    path: CullPath,
    /// `elapsed` of the last title refresh.
    title_updated: f64,
    /// First fatal error; returned from [`run`] once the loop exits.
    error: Option<anyhow::Error>,
}

impl Runner {
    fn new(config: AppConfig) -> Self {
        let layout = config.scene.layout();
        let store = match config.scene.seed {
            Some(seed) => InstanceStore::scatter(&layout, &mut StdRng::seed_from_u64(seed)),
            None => InstanceStore::scatter(&layout, &mut rand::thread_rng()),
        };
        log::info!("scene: {} instances ({} animated)", store.len(), store.instances().iter().filter(|i| i.animated).count());

        let path = if config.culling.gpu { CullPath::Gpu } else { CullPath::Cpu };
        Self {
            config,
            window: None,
            graphics: None,
            input: InputState::new(),
            clock: FrameClock::new(),
            spin: Spin::default(),
            camera: OrbitCamera::default(),
            store,
            path,
            title_updated: f64::NEG_INFINITY,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_cfg = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(&window_cfg.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(window_cfg.width, window_cfg.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create the window")?,
        );

        let gfx = pollster::block_on(GraphicsState::new(
            window.clone(),
            window_cfg.vsync,
            self.config.culling.capacity,
        ))?;

        if !gfx.renderer.supports(self.path) {
            log::warn!("{} culling is unavailable; starting on the CPU path", self.path);
            self.path = CullPath::Cpu;
        }
        log::info!("culling path: {}", self.path);
        self.camera.set_aspect(gfx.renderer.viewport.aspect());

        self.window = Some(window);
        self.graphics = Some(gfx);
        Ok(())
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gfx), Some(window)) = (&mut self.graphics, &self.window) else {
            return;
        };
        let time = self.clock.tick();

        // ── Input ────────────────────────────────────────────────────────────
        if self.input.just_pressed(KeyCode::Escape) {
            event_loop.exit();
            return;
        }
        if self.input.just_pressed(KeyCode::KeyC) {
            let next = self.path.toggle();
            if gfx.renderer.supports(next) {
                self.path = next;
                log::info!("culling path: {next}");
            } else {
                log::info!("{next} culling is unavailable on this adapter");
            }
        }
        let (dx, dy) = self.input.take_drag();
        if dx != 0.0 || dy != 0.0 {
            self.camera.drag(dx, dy, gfx.config.width);
        }
        let wheel = self.input.take_wheel();
        if wheel != 0.0 {
            self.camera.zoom(wheel);
        }
        self.input.end_frame();

        // ── Update ───────────────────────────────────────────────────────────
        let angle = self.spin.advance(time.delta);
        self.store.animate(angle);

        // ── Render ───────────────────────────────────────────────────────────
        let frame = match gfx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gfx.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timed out; skipping frame");
                return;
            }
            Err(e) => {
                let error = anyhow::Error::new(e).context("cannot acquire the next frame");
                self.fail(event_loop, error);
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gfx.renderer.begin_frame();
        let stats = gfx.renderer.render_frame(
            &mut encoder,
            &view,
            FrameInput {
                camera: &self.camera,
                instances: &mut self.store,
                path: self.path,
            },
        );
        gfx.renderer.submit(encoder);
        frame.present();

        if time.elapsed - self.title_updated >= TITLE_INTERVAL {
            self.title_updated = time.elapsed;
            window.set_title(&title(&self.config.window.title, &stats, self.path));
            log::debug!("{stats} ({}), drawn {}, {:.0} fps", self.path, stats.drawn, time.fps());
        }
    }
}

fn title(base: &str, stats: &CullStats, path: CullPath) -> String {
    format!("{base} | {stats} ({path})")
}

impl ApplicationHandler for Runner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(gfx) = &mut self.graphics {
                    gfx.resize(size.width, size.height);
                    self.camera.set_aspect(gfx.renderer.viewport.aspect());
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.input.update_key(code, event.state.is_pressed());
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.update_mouse_button(button, state.is_pressed());
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.set_cursor(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => self.input.cursor_left(),
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => self.input.add_wheel(y * WHEEL_NOTCH),
                MouseScrollDelta::PixelDelta(p) => self.input.add_wheel(p.y as f32),
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.frame(event_loop);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Opens the demo window and runs until it is closed or a fatal error
/// occurs.
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("failed to create the event loop")?;
    // Poll = spin the loop as fast as possible; no sleeping between frames.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runner = Runner::new(config);
    event_loop
        .run_app(&mut runner)
        .context("event loop terminated abnormally")?;

    match runner.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_marks_gpu_counts_as_late() {
        let stats = CullStats { total: 20, visible: 11, drawn: 11, exact: true };
        assert_eq!(title("Vista", &stats, CullPath::Cpu), "Vista | 11/20 visible (CPU)");
        let late = CullStats { exact: false, ..stats };
        assert_eq!(title("Vista", &late, CullPath::Gpu), "Vista | 11/20~ visible (GPU)");
    }
}
