//! Fixed-stride GPU array of `Pod` elements.
//!
//! Holds instance transforms and bounding boxes for both culling paths.
//! The capacity only grows: [`ArrayBuffer::ensure_capacity`] doubles it until
//! the request fits and reallocates, so any bind group that references the
//! old buffer must be rebuilt when it reports a reallocation.
use std::marker::PhantomData;
use std::sync::Arc;

use crate::resources::buffer;

pub struct ArrayBuffer<T> {
    pub buffer: Arc<wgpu::Buffer>,
    label: &'static str,
    usage: wgpu::BufferUsages,
    /// Capacity in elements.
    capacity: usize,
    _element: PhantomData<T>,
}

impl<T: bytemuck::Pod> ArrayBuffer<T> {
    /// Bytes per element.
    pub const STRIDE: u64 = std::mem::size_of::<T>() as u64;

    /// Creates a zeroed array for at least one element.  `COPY_DST` is
    /// always added to `usage`.
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Self::allocate(device, label, capacity, usage),
            label,
            usage,
            capacity,
            _element: PhantomData,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Writes `data` starting at element 0.
    ///
    /// Extra elements beyond the capacity are dropped (and flagged in debug
    /// builds); they never spill past the end of the buffer.
    pub fn write(&self, queue: &wgpu::Queue, data: &[T]) {
        debug_assert!(data.len() <= self.capacity, "{} overflow", self.label);
        let n = data.len().min(self.capacity);
        if n > 0 {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&data[..n]));
        }
    }

    /// Grows the allocation so it holds at least `needed` elements.
    ///
    /// Returns `true` when the buffer was reallocated.  The new buffer starts
    /// zeroed; previous contents are not carried over.
    pub fn ensure_capacity(&mut self, device: &wgpu::Device, needed: usize) -> bool {
        if needed <= self.capacity {
            return false;
        }
        let mut new_cap = self.capacity;
        while new_cap < needed {
            new_cap *= 2;
        }
        self.buffer = Self::allocate(device, self.label, new_cap, self.usage);
        self.capacity = new_cap;
        true
    }

    fn allocate(
        device: &wgpu::Device,
        label: &str,
        capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Arc<wgpu::Buffer> {
        buffer::create_zeroed(device, label, capacity as u64 * Self::STRIDE, usage)
    }
}
