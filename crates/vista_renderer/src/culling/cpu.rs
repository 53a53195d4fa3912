//! CPU culling path: classify on the CPU, upload the compacted survivors.
use std::sync::Arc;

use bytemuck::Zeroable;
use vista_core::{Compaction, Frustum, InstanceRaw, InstanceStore};

use crate::culling::{CullPath, CullStats, CullingStrategy, DrawSource};
use crate::graph::DrawCount;
use crate::resources::ArrayBuffer;

/// Classifies every instance, packs the visible ones into `out` in store
/// order (at most `capacity`) and zero-pads `out` to exactly `capacity`
/// entries, the size of the buffer it replaces.
pub fn cull_and_pack(
    store: &mut InstanceStore,
    frustum: &Frustum,
    capacity: usize,
    out: &mut Vec<InstanceRaw>,
) -> Compaction {
    store.classify(frustum);
    let compaction = store.compact_into(out, capacity);
    out.resize(capacity, InstanceRaw::zeroed());
    compaction
}

pub struct CpuCuller {
    instances: ArrayBuffer<InstanceRaw>,
    scratch: Vec<InstanceRaw>,
    drawn: u32,
    /// Truncation reported last, so the warning fires on change only.
    last_truncated: usize,
}

impl CpuCuller {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        Self {
            instances: ArrayBuffer::new(
                device,
                "CPU Compacted Instances",
                capacity,
                wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
            ),
            scratch: Vec::with_capacity(capacity),
            drawn: 0,
            last_truncated: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.instances.capacity()
    }

    pub fn instance_buffer(&self) -> &Arc<wgpu::Buffer> {
        &self.instances.buffer
    }
}

impl CullingStrategy for CpuCuller {
    fn path(&self) -> CullPath {
        CullPath::Cpu
    }

    fn prepare(
        &mut self,
        _device: &wgpu::Device,
        queue: &wgpu::Queue,
        store: &mut InstanceStore,
        frustum: &Frustum,
    ) -> CullStats {
        let capacity = self.capacity();
        let compaction = cull_and_pack(store, frustum, capacity, &mut self.scratch);
        self.instances.write(queue, &self.scratch);

        let truncated = compaction.truncated();
        if truncated != self.last_truncated {
            if truncated > 0 {
                log::warn!(
                    "{} visible instances exceed the capacity of {}; dropping {}",
                    compaction.visible,
                    capacity,
                    truncated
                );
            } else {
                log::info!("visible instances fit the capacity of {} again", capacity);
            }
            self.last_truncated = truncated;
        }

        self.drawn = compaction.written as u32;
        CullStats {
            total: store.len(),
            visible: compaction.visible,
            drawn: compaction.written,
            exact: true,
        }
    }

    fn draw_source(&self) -> DrawSource {
        DrawSource {
            instances: self.instances.buffer.clone(),
            count: DrawCount::Direct(self.drawn),
        }
    }
}
