//! GPU culling path: `cull.wgsl` classifies and compacts on the device and
//! writes the indirect draw arguments.
//!
//! Per frame:
//!
//! 1. `prepare`: collect a finished visible-count readback, upload bounds
//!    (only when the instance count changed) and source instances, write
//!    the params, reset the counters to `{ index_count, 0, 0, 0, 0, 0 }`.
//! 2. `record`: dispatch `ceil(n / 64)` workgroups, copy the draw args →
//!    indirect buffer and, when no readback is in flight, `visible` →
//!    readback.
//! 3. `after_submit`: map the readback buffer; a later `prepare` picks the
//!    value up, so the reported counts trail the frame by at least one.
use std::sync::mpsc;
use std::sync::Arc;

use vista_core::{AabbRaw, Frustum, InstanceRaw, InstanceStore};

use crate::culling::{CullPath, CullStats, CullingStrategy, DrawSource};
use crate::graph::DrawCount;
use crate::passes::ComputePass;
use crate::pipeline::{culling_layout, ComputePipeline};
use crate::resources::{buffer, ArrayBuffer};

/// `@workgroup_size` of the `cull` entry point.
pub const WORKGROUP_SIZE: u32 = 64;

const SHADER: &str = include_str!("../../../../assets/shaders/cull.wgsl");

/// `struct CullParams` in `cull.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CullParams {
    pub instance_count: u32,
    pub capacity: u32,
    pub index_count: u32,
    pub _pad: u32,
}

/// `DrawIndexedIndirectArgs` as laid out in the counters/indirect buffers.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

impl DrawArgs {
    pub const SIZE: u64 = std::mem::size_of::<DrawArgs>() as u64;
}

/// `struct CullCounters` in `cull.wgsl`: the draw args the kernel appends
/// through, followed by the number of instances that passed the test.
/// `visible` is not capped, so it exceeds `args.instance_count` on overflow.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CullCounters {
    pub args: DrawArgs,
    pub visible: u32,
}

impl CullCounters {
    pub const SIZE: u64 = std::mem::size_of::<CullCounters>() as u64;
    /// Byte offset of `visible`.
    pub const VISIBLE_OFFSET: u64 = DrawArgs::SIZE;

    /// Counters at the start of a frame: the mesh, nothing appended.
    pub fn reset(index_count: u32) -> Self {
        Self {
            args: DrawArgs { index_count, ..Default::default() },
            visible: 0,
        }
    }
}

/// Workgroups needed for `n` invocations.
pub fn workgroups_for(n: usize) -> u32 {
    (n as u32).div_ceil(WORKGROUP_SIZE)
}

enum Readback {
    Idle,
    /// Copy recorded into the current frame, not yet submitted.
    Copied,
    /// `map_async` issued; the callback reports here.
    Mapping(mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>),
}

pub struct GpuCuller {
    capacity: usize,
    index_count: u32,
    layout: wgpu::BindGroupLayout,
    scene: Arc<wgpu::Buffer>,
    params: Arc<wgpu::Buffer>,
    bounds: ArrayBuffer<AabbRaw>,
    source: ArrayBuffer<InstanceRaw>,
    compacted: ArrayBuffer<InstanceRaw>,
    /// [`CullCounters`]; the kernel's only read-write storage besides
    /// `compacted`.
    counters: Arc<wgpu::Buffer>,
    indirect: Arc<wgpu::Buffer>,
    readback: Arc<wgpu::Buffer>,
    dispatch: ComputePass,
    /// Instance count the bounds buffer was last filled for.
    uploaded_bounds: Option<usize>,
    scratch: Vec<InstanceRaw>,
    total: usize,
    readback_state: Readback,
    /// Latest survivor count read back from the device, before the
    /// capacity cap.
    last_visible: u32,
}

impl GpuCuller {
    /// `scene` is the renderer's `Scene` uniform; the kernel reads its
    /// planes so both paths classify against the same data.
    pub fn new(
        device: &wgpu::Device,
        scene: Arc<wgpu::Buffer>,
        capacity: usize,
        index_count: u32,
    ) -> Self {
        let storage = wgpu::BufferUsages::STORAGE;
        let layout = culling_layout(device);
        let pipeline = ComputePipeline::new(device, SHADER, &[&layout], "cull", Some("Frustum Cull"));

        let params = buffer::create_uniform(device, "Cull Params", &CullParams::default());
        let bounds = ArrayBuffer::new(device, "Cull Bounds", capacity, storage);
        let source = ArrayBuffer::new(device, "Cull Source Instances", capacity, storage);
        let compacted = ArrayBuffer::new(
            device,
            "GPU Compacted Instances",
            capacity,
            storage | wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
        );
        let counters = buffer::create_zeroed(
            device,
            "Cull Counters",
            CullCounters::SIZE,
            storage | wgpu::BufferUsages::COPY_SRC,
        );
        let indirect = buffer::create_zeroed(
            device,
            "Indirect Draw Args",
            DrawArgs::SIZE,
            wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::COPY_SRC,
        );
        let readback = buffer::create_zeroed(
            device,
            "Visible Count Readback",
            4,
            wgpu::BufferUsages::MAP_READ,
        );

        let mut culler = Self {
            capacity: compacted.capacity(),
            index_count,
            dispatch: ComputePass::new("Frustum Cull", pipeline, (0, 1, 1), Vec::new()),
            layout,
            scene,
            params,
            bounds,
            source,
            compacted,
            counters,
            indirect,
            readback,
            uploaded_bounds: None,
            scratch: Vec::new(),
            total: 0,
            readback_state: Readback::Idle,
            last_visible: 0,
        };
        culler.rebind(device);
        culler
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Compacted instances (`STORAGE | VERTEX | COPY_SRC`).
    pub fn compacted_buffer(&self) -> &Arc<wgpu::Buffer> {
        &self.compacted.buffer
    }

    /// Kernel counters of the last dispatch (`STORAGE | COPY_SRC`).
    pub fn counters_buffer(&self) -> &Arc<wgpu::Buffer> {
        &self.counters
    }

    /// Indirect draw arguments (`INDIRECT | COPY_SRC`).
    pub fn indirect_buffer(&self) -> &Arc<wgpu::Buffer> {
        &self.indirect
    }

    fn rebind(&mut self, device: &wgpu::Device) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cull Bind Group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: self.scene.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: self.params.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: self.bounds.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: self.source.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 4, resource: self.compacted.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 5, resource: self.counters.as_entire_binding() },
            ],
        });
        self.dispatch.set_bind_groups(vec![bind_group]);
    }

    /// Picks up a finished readback without blocking.
    fn poll_readback(&mut self, device: &wgpu::Device) {
        let received = match &self.readback_state {
            Readback::Mapping(rx) => {
                let _ = device.poll(wgpu::Maintain::Poll);
                rx.try_recv()
            }
            _ => return,
        };
        match received {
            Ok(Ok(())) => {
                let slice = self.readback.slice(..);
                let bytes = slice.get_mapped_range();
                self.last_visible = bytemuck::pod_read_unaligned(&bytes[..4]);
                drop(bytes);
                self.readback.unmap();
                self.readback_state = Readback::Idle;
            }
            Ok(Err(e)) => {
                log::warn!("visible count readback failed: {e}");
                self.readback_state = Readback::Idle;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => self.readback_state = Readback::Idle,
        }
    }
}

impl CullingStrategy for GpuCuller {
    fn path(&self) -> CullPath {
        CullPath::Gpu
    }

    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        store: &mut InstanceStore,
        _frustum: &Frustum,
    ) -> CullStats {
        self.poll_readback(device);

        let n = store.len();
        let grown_bounds = self.bounds.ensure_capacity(device, n);
        let grown_source = self.source.ensure_capacity(device, n);
        if grown_bounds || grown_source {
            self.rebind(device);
        }
        if grown_bounds || self.uploaded_bounds != Some(n) {
            self.bounds.write(queue, &store.gpu_bounds());
            self.uploaded_bounds = Some(n);
        }

        store.raw_into(&mut self.scratch);
        self.source.write(queue, &self.scratch);

        let params = CullParams {
            instance_count: n as u32,
            capacity: self.capacity as u32,
            index_count: self.index_count,
            _pad: 0,
        };
        buffer::update_uniform(queue, &self.params, &params);
        queue.write_buffer(&self.counters, 0, bytemuck::bytes_of(&CullCounters::reset(self.index_count)));

        self.total = n;
        self.dispatch.set_workgroup_count(workgroups_for(n), 1, 1);

        let seen = self.last_visible as usize;
        CullStats {
            total: n,
            visible: seen,
            drawn: seen.min(self.capacity),
            exact: false,
        }
    }

    fn record(&mut self, encoder: &mut wgpu::CommandEncoder) {
        self.dispatch.record(encoder);
        encoder.copy_buffer_to_buffer(&self.counters, 0, &self.indirect, 0, DrawArgs::SIZE);
        if matches!(self.readback_state, Readback::Idle) {
            encoder.copy_buffer_to_buffer(
                &self.counters,
                CullCounters::VISIBLE_OFFSET,
                &self.readback,
                0,
                4,
            );
            self.readback_state = Readback::Copied;
        }
    }

    fn draw_source(&self) -> DrawSource {
        DrawSource {
            instances: self.compacted.buffer.clone(),
            count: DrawCount::Indirect(self.indirect.clone()),
        }
    }

    fn after_submit(&mut self) {
        if !matches!(self.readback_state, Readback::Copied) {
            return;
        }
        let (tx, rx) = mpsc::channel();
        self.readback.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.readback_state = Readback::Mapping(rx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use vista_core::{Aabb, OrbitCamera, ScatterLayout};

    /// Runs the kernel's body for every instance in parallel: same test,
    /// same add-then-undo append.  Returns the compacted slots and the final
    /// `(instance_count, visible)` counters.
    fn emulate_kernel(
        bounds: &[Aabb],
        source: &[InstanceRaw],
        frustum: &Frustum,
        capacity: usize,
    ) -> (Vec<Option<InstanceRaw>>, u32, u32) {
        let counter = AtomicU32::new(0);
        let visible = AtomicU32::new(0);
        let writes: Vec<(usize, InstanceRaw)> = (0..source.len())
            .into_par_iter()
            .filter(|&i| frustum.intersects_aabb(&bounds[i]))
            .filter_map(|i| {
                visible.fetch_add(1, Ordering::AcqRel);
                let slot = counter.fetch_add(1, Ordering::AcqRel);
                if slot as usize >= capacity {
                    counter.fetch_sub(1, Ordering::AcqRel);
                    return None;
                }
                let mut inst = source[i];
                inst.params[3] = 1.0;
                Some((slot as usize, inst))
            })
            .collect();

        let mut slots = vec![None; capacity];
        for (slot, inst) in writes {
            assert!(slots[slot].is_none(), "slot {slot} written twice");
            slots[slot] = Some(inst);
        }
        (slots, counter.into_inner(), visible.into_inner())
    }

    fn scattered(count: usize, seed: u64) -> InstanceStore {
        let layout = ScatterLayout { count, ..Default::default() };
        InstanceStore::scatter(&layout, &mut StdRng::seed_from_u64(seed))
    }

    fn translations(raws: impl IntoIterator<Item = InstanceRaw>) -> HashSet<[u32; 3]> {
        raws.into_iter().map(|r| r.translation().map(f32::to_bits)).collect()
    }

    #[test]
    fn workgroup_rounding() {
        assert_eq!(workgroups_for(0), 0);
        assert_eq!(workgroups_for(1), 1);
        assert_eq!(workgroups_for(64), 1);
        assert_eq!(workgroups_for(65), 2);
    }

    #[test]
    fn shader_layouts_match() {
        assert_eq!(DrawArgs::SIZE, 20);
        assert_eq!(CullCounters::SIZE, 24);
        assert_eq!(std::mem::size_of::<CullParams>(), 16);
        assert_eq!(CullCounters::SIZE % wgpu::COPY_BUFFER_ALIGNMENT, 0);

        let counters = CullCounters { visible: 7, ..CullCounters::reset(36) };
        let bytes = bytemuck::bytes_of(&counters);
        let off = CullCounters::VISIBLE_OFFSET as usize;
        assert_eq!(u32::from_le_bytes(bytes[off..off + 4].try_into().unwrap()), 7);
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 36);
    }

    #[test]
    fn kernel_matches_the_cpu_set() {
        let mut store = scattered(200, 7);
        let frustum = OrbitCamera::default().frustum();

        let mut cpu = Vec::new();
        store.classify(&frustum);
        let c = store.compact_into(&mut cpu, usize::MAX);

        let mut source = Vec::new();
        store.raw_into(&mut source);
        let (slots, count, visible) = emulate_kernel(store.bounds(), &source, &frustum, 256);

        assert_eq!(count as usize, c.visible);
        assert_eq!(visible, count);
        let written: Vec<InstanceRaw> = slots.into_iter().flatten().collect();
        assert_eq!(written.len(), c.visible);
        assert!(written.iter().all(|r| r.params[3] == 1.0));
        assert_eq!(translations(written), translations(cpu));
    }

    #[test]
    fn kernel_overflow_fills_capacity_and_counts_every_survivor() {
        const CAP: usize = 16;
        let frustum = OrbitCamera::default().frustum();
        let mut store = InstanceStore::default();
        for i in 0..CAP + 5 {
            store.push(vista_core::Instance::new(
                vista_core::Transform::from_position(glam::Vec3::new(0.0, 0.0, i as f32 * 0.05)),
                vista_core::Material::default(),
            ));
        }
        let survivors = store.classify(&frustum);
        assert!(survivors > CAP);
        let mut source = Vec::new();
        store.raw_into(&mut source);

        for _ in 0..20 {
            let (slots, count, visible) = emulate_kernel(store.bounds(), &source, &frustum, CAP);
            assert_eq!(count as usize, CAP);
            assert_eq!(visible as usize, survivors);
            assert!(slots.iter().all(Option::is_some));
        }
    }
}
