//! Data assembled once per frame and passed immutably to every
//! `RenderPass`.
//!
//! Passes only see resolved GPU handles and counts; which culling path
//! produced them is invisible at this level.
use std::sync::Arc;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Rectangular region within the render target used for 3-D content.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    /// Width / height, 1.0 for a degenerate rectangle.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

// ── Instanced draws ───────────────────────────────────────────────────────────

/// How many instances a draw covers.
#[derive(Clone, Debug)]
pub enum DrawCount {
    /// Count known on the CPU (CPU culling path).
    Direct(u32),
    /// `DrawIndexedIndirectArgs` at offset 0 of the buffer, written on the
    /// GPU (GPU culling path).
    Indirect(Arc<wgpu::Buffer>),
}

/// One instanced mesh draw, fully resolved to GPU handles.
pub struct InstancedDraw {
    pub vertex_buffer: Arc<wgpu::Buffer>,
    pub index_buffer: Arc<wgpu::Buffer>,
    pub index_count: u32,
    pub index_format: wgpu::IndexFormat,
    /// Compacted `InstanceRaw` entries, bound at vertex slot 1.
    pub instances: Arc<wgpu::Buffer>,
    pub count: DrawCount,
}

// ── Frame packet ──────────────────────────────────────────────────────────────

pub struct FramePacket {
    pub viewport: Option<Viewport>,
    pub draws: Vec<InstancedDraw>,
}
