//! Frustum culling strategies that feed the instanced pass.
//!
//! Both strategies produce a compacted `InstanceRaw` buffer bound as the
//! per-instance vertex stream; they differ only in where classification and
//! compaction run and in how the draw learns its instance count.
//!
//! | Path  | Classify + compact        | Draw count                     |
//! |-------|---------------------------|--------------------------------|
//! | `Cpu` | `InstanceStore`, per frame | `DrawCount::Direct`            |
//! | `Gpu` | `cull.wgsl`, per frame     | `DrawCount::Indirect` (atomic) |
//!
//! Each strategy owns its own transient buffers, so the active path can
//! change between any two frames.
use std::fmt;
use std::sync::Arc;

use vista_core::{Frustum, InstanceStore};

use crate::graph::DrawCount;

pub mod cpu;
pub mod gpu;

pub use cpu::CpuCuller;
pub use gpu::{CullCounters, CullParams, DrawArgs, GpuCuller};

// ── Path selection ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CullPath {
    #[default]
    Cpu,
    Gpu,
}

impl CullPath {
    pub fn toggle(self) -> Self {
        match self {
            CullPath::Cpu => CullPath::Gpu,
            CullPath::Gpu => CullPath::Cpu,
        }
    }
}

impl fmt::Display for CullPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CullPath::Cpu => "CPU",
            CullPath::Gpu => "GPU",
        })
    }
}

// ── Diagnostics ───────────────────────────────────────────────────────────────

/// Per-frame culling counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CullStats {
    /// Instances considered.
    pub total: usize,
    /// Instances that passed the frustum test.
    pub visible: usize,
    /// Instances actually drawn (`visible` capped at the buffer capacity).
    pub drawn: usize,
    /// `false` when the counts come from an earlier frame's GPU readback.
    pub exact: bool,
}

impl fmt::Display for CullStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let approx = if self.exact { "" } else { "~" };
        write!(f, "{}/{}{} visible", self.visible, self.total, approx)
    }
}

// ── Strategy ──────────────────────────────────────────────────────────────────

/// Where the instanced pass reads this frame's instances and count from.
#[derive(Clone, Debug)]
pub struct DrawSource {
    pub instances: Arc<wgpu::Buffer>,
    pub count: DrawCount,
}

/// One culling path.  Called in order `prepare` → `record` → (passes) →
/// submit → `after_submit` once per frame.
pub trait CullingStrategy: Send {
    fn path(&self) -> CullPath;

    /// Uploads this frame's inputs.  The encoder is not available yet.
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        store: &mut InstanceStore,
        frustum: &Frustum,
    ) -> CullStats;

    /// Records GPU work that must run before the draw.
    #[allow(unused_variables)]
    fn record(&mut self, encoder: &mut wgpu::CommandEncoder) {}

    fn draw_source(&self) -> DrawSource;

    /// Called once the frame's command buffer has been submitted.
    fn after_submit(&mut self) {}
}
