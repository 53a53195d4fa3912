//! A drawable GPU mesh: vertex/index buffers plus the index count.
//!
//! Cloning a `Mesh` clones the `Arc`s, not GPU memory.
use std::sync::Arc;

#[derive(Clone)]
pub struct Mesh {
    pub vertex_buffer: Arc<wgpu::Buffer>,
    pub index_buffer: Arc<wgpu::Buffer>,
    pub index_count: u32,
    pub index_format: wgpu::IndexFormat,
}

impl Mesh {
    /// Unit cube centred at the origin (extent ±0.5).
    pub fn cube(device: &wgpu::Device) -> Self {
        super::primitives::cube(device)
    }
}
