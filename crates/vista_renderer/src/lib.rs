//! `vista_renderer`: frustum-culled instanced rendering on wgpu.
//!
//! # Module layout
//!
//! | Module          | Responsibility                                        |
//! |-----------------|-------------------------------------------------------|
//! | `context`       | Re-exports `EngineContext`                            |
//! | `resources`     | Buffer / texture allocation helpers, `ArrayBuffer`    |
//! | `geometry`      | `Vertex`, `Mesh`, the unit cube                       |
//! | `scene`         | `SceneUniform` (camera + frustum planes) on the GPU   |
//! | `pipeline`      | Bind-group layouts, instanced + compute pipelines     |
//! | `render_target` | Depth target                                          |
//! | `culling`       | `CullingStrategy` with the CPU and GPU paths          |
//! | `graph`         | `RenderPass` trait + `FramePacket`                    |
//! | `passes`        | `InstancedPass`, `ComputePass`                        |
pub mod context;
pub mod culling;
pub mod geometry;
pub mod graph;
pub mod passes;
pub mod pipeline;
pub mod render_target;
pub mod resources;
pub mod scene;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use context::EngineContext;
pub use culling::{CpuCuller, CullPath, CullStats, CullingStrategy, DrawSource, GpuCuller};
pub use geometry::{Mesh, Vertex};
pub use graph::{DrawCount, FramePacket, InstancedDraw, RenderPass, Viewport};
pub use scene::SceneUniform;

// ── Internal imports ──────────────────────────────────────────────────────────

use thiserror::Error;
use vista_core::{InstanceStore, OrbitCamera};

use passes::InstancedPass;
use pipeline::PipelineLayouts;
use render_target::DepthTarget;
use scene::GpuScene;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("instance capacity must be at least 1")]
    ZeroCapacity,
    #[error("buffer readback failed: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),
    #[error("buffer readback was abandoned before completing")]
    ReadbackAbandoned,
}

/// Everything a frame needs from the caller.
pub struct FrameInput<'a> {
    pub camera: &'a OrbitCamera,
    pub instances: &'a mut InstanceStore,
    pub path: CullPath,
}

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Top-level renderer.
///
/// Each frame it extracts the frustum, syncs the scene uniform, lets the
/// selected [`CullingStrategy`] compact the visible instances, then runs the
/// registered [`RenderPass`] list (`prepare` → `execute`).  The built-in
/// [`InstancedPass`] is registered during construction; custom passes can be
/// appended with [`Renderer::add_pass`].
pub struct Renderer {
    pub context: EngineContext,
    /// Ordered list of passes executed every frame.
    pub passes: Vec<Box<dyn RenderPass>>,

    depth: DepthTarget,
    scene: GpuScene,
    mesh: Mesh,

    // ── Culling ───────────────────────────────────────────────────────────
    cpu: CpuCuller,
    /// `None` when the adapter cannot run compute + indirect draws.
    gpu: Option<GpuCuller>,
    /// Path that recorded the frame awaiting `submit`.
    active: CullPath,

    // ── Viewport ──────────────────────────────────────────────────────────
    pub viewport: Viewport,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Creates a renderer whose compacted instance buffers hold `capacity`
    /// entries.
    pub fn new(
        context: EngineContext,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        capacity: usize,
    ) -> Result<Self, RendererError> {
        if capacity == 0 {
            return Err(RendererError::ZeroCapacity);
        }
        let device = &context.device;

        let depth = DepthTarget::new(device, width, height);
        let layouts = PipelineLayouts::new(device);
        let scene = GpuScene::new(device, &OrbitCamera::default(), &layouts.scene);
        let mesh = Mesh::cube(device);

        let cpu = CpuCuller::new(device, capacity);
        let gpu = if context.supports_gpu_culling() {
            Some(GpuCuller::new(device, scene.buffer.clone(), capacity, mesh.index_count))
        } else {
            log::warn!("adapter lacks compute/indirect support; GPU culling falls back to the CPU path");
            None
        };
        log::info!("renderer ready: capacity {capacity}, GPU culling {}", gpu.is_some());

        let mut renderer = Self {
            passes: Vec::new(),
            depth,
            mesh,
            cpu,
            gpu,
            active: CullPath::Cpu,
            viewport: Viewport::full(width, height),
            format,
            width,
            height,
            scene,
            context,
        };
        let instanced = InstancedPass::new(layouts, renderer.scene.bind_group.clone());
        renderer.add_pass(Box::new(instanced));
        Ok(renderer)
    }

    /// Whether `path` runs as requested rather than falling back.
    pub fn supports(&self, path: CullPath) -> bool {
        match path {
            CullPath::Cpu => true,
            CullPath::Gpu => self.gpu.is_some(),
        }
    }

    // ── Frame API ─────────────────────────────────────────────────────────────

    /// Allocates a fresh `CommandEncoder` for the current frame.
    pub fn begin_frame(&self) -> wgpu::CommandEncoder {
        self.context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            })
    }

    /// Culls and draws one frame into `view`.
    ///
    /// Returns the culling counters; on the GPU path they describe an
    /// earlier frame (`exact == false`).
    pub fn render_frame(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        input: FrameInput<'_>,
    ) -> CullStats {
        let device = &self.context.device;
        let queue = &self.context.queue;

        // 1. Planes for this frame, shared by both paths through the uniform
        let frustum = input.camera.frustum();
        self.scene.sync(queue, input.camera, &frustum);

        // 2. Cull
        let path = if self.supports(input.path) { input.path } else { CullPath::Cpu };
        let strategy = strategy_mut(&mut self.cpu, &mut self.gpu, path);
        let stats = strategy.prepare(device, queue, input.instances, &frustum);
        strategy.record(encoder);
        let source = strategy.draw_source();
        self.active = path;

        // 3. Packet
        let packet = FramePacket {
            viewport: Some(self.viewport),
            draws: vec![InstancedDraw {
                vertex_buffer: self.mesh.vertex_buffer.clone(),
                index_buffer: self.mesh.index_buffer.clone(),
                index_count: self.mesh.index_count,
                index_format: self.mesh.index_format,
                instances: source.instances,
                count: source.count,
            }],
        };

        // 4. Passes
        for pass in &mut self.passes {
            pass.prepare(device, queue, &packet);
            pass.execute(device, queue, encoder, view, Some(&self.depth.view), &packet);
        }
        stats
    }

    /// Submits the frame's commands and lets the active path start its
    /// post-submit work (the GPU count readback).
    pub fn submit(&mut self, encoder: wgpu::CommandEncoder) {
        self.context.queue.submit(Some(encoder.finish()));
        strategy_mut(&mut self.cpu, &mut self.gpu, self.active).after_submit();
    }

    // ── Pass management ───────────────────────────────────────────────────────

    /// Attaches and appends a pass.  Passes execute in insertion order.
    pub fn add_pass(&mut self, mut pass: Box<dyn RenderPass>) {
        pass.on_attach(&self.context.device, &self.context.queue, self.format, 1);
        self.passes.push(pass);
    }

    // ── Resize / viewport ─────────────────────────────────────────────────────

    /// Recreates size-dependent targets when the window changes size.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width == self.width && new_height == self.height {
            return;
        }
        self.depth.resize(&self.context.device, new_width, new_height);

        // Stretch the viewport if it covered the full window before.
        if self.viewport == Viewport::full(self.width, self.height) {
            self.viewport = Viewport::full(new_width, new_height);
        }
        self.width = new_width;
        self.height = new_height;

        for pass in &mut self.passes {
            pass.on_resize(&self.context.device, &self.context.queue, new_width, new_height);
        }
    }

    pub fn set_viewport(&mut self, vp: Viewport) {
        self.viewport = vp;
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn cpu_culler(&self) -> &CpuCuller {
        &self.cpu
    }

    pub fn gpu_culler(&self) -> Option<&GpuCuller> {
        self.gpu.as_ref()
    }
}

fn strategy_mut<'a>(
    cpu: &'a mut CpuCuller,
    gpu: &'a mut Option<GpuCuller>,
    path: CullPath,
) -> &'a mut dyn CullingStrategy {
    match (path, gpu) {
        (CullPath::Gpu, Some(gpu)) => gpu,
        _ => cpu,
    }
}
