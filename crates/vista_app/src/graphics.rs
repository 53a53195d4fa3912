use std::sync::Arc;

use anyhow::Context as _;
use vista_core::context::EngineContext;
use vista_renderer::Renderer;
use winit::window::Window;

/// Surface + renderer for one window.
pub struct GraphicsState {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub renderer: Renderer,
}

impl GraphicsState {
    pub async fn new(window: Arc<Window>, vsync: bool, capacity: usize) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        // The surface owns an `Arc` of the window, so it is `'static`.
        let surface = instance
            .create_surface(window)
            .context("failed to create a surface for the window")?;
        let context = EngineContext::new_with_instance(instance, Some(&surface)).await?;

        let caps = surface.get_capabilities(&context.adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let present_mode = if vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&context.device, &config);
        log::info!("surface {}x{} {:?} {:?}", config.width, config.height, format, present_mode);

        let renderer = Renderer::new(context, config.width, config.height, config.format, capacity)
            .context("failed to create the renderer")?;

        Ok(Self {
            surface,
            config,
            renderer,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.reconfigure();
            self.renderer.resize(width, height);
        }
    }

    /// Re-applies the current configuration (after `Lost` / `Outdated`).
    pub fn reconfigure(&self) {
        self.surface.configure(&self.renderer.context.device, &self.config);
    }
}
