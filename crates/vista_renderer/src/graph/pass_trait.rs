//! The `RenderPass` trait: every stage of the frame implements this.
//!
//! ## Two-phase design
//! `prepare` → `execute` lets passes upload GPU data **before** opening a
//! `wgpu::RenderPass`, since `write_buffer` cannot be interleaved with an
//! open pass on the same encoder.
//!
//! ## Lifecycle
//! `on_attach` allocates format-dependent resources once, `on_resize`
//! recreates size-dependent ones, and dropping the pass releases them.
use wgpu::{CommandEncoder, Device, Queue, TextureView};

use crate::graph::FramePacket;

pub trait RenderPass: Send + Sync + 'static {
    /// Short human-readable label used as the wgpu debug label.
    fn name(&self) -> &str;

    // ── Lifecycle hooks (all optional) ────────────────────────────────────

    /// Called once when the pass is registered with the renderer.
    #[allow(unused_variables)]
    fn on_attach(
        &mut self,
        device: &Device,
        queue: &Queue,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) {
    }

    /// Called whenever the render target dimensions change.
    #[allow(unused_variables)]
    fn on_resize(&mut self, device: &Device, queue: &Queue, width: u32, height: u32) {}

    // ── Required: per-frame loop ──────────────────────────────────────────

    /// Upload GPU data.  Called **before** `execute` each frame.
    fn prepare(&mut self, device: &Device, queue: &Queue, packet: &FramePacket);

    /// Record commands into `encoder`.
    ///
    /// - `color_view` — color attachment
    /// - `depth_view` — depth attachment, or `None` for passes that skip depth
    fn execute(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_view: &TextureView,
        depth_view: Option<&TextureView>,
        packet: &FramePacket,
    );
}
