//! Bind-group layouts shared between pipelines.
//!
//! The scene layout is created once and shared via `Arc`, so the instanced
//! pass and anything added later bind the same `Scene` uniform without
//! re-creating the layout.
use std::sync::Arc;

#[derive(Clone)]
pub struct PipelineLayouts {
    /// group(0): `Scene` uniform at binding 0, vertex + fragment.
    pub scene: Arc<wgpu::BindGroupLayout>,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let scene = Arc::new(device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Layout: Scene"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
            },
        ));
        Self { scene }
    }
}

/// group(0) of `cull.wgsl`.
///
/// | binding | resource                     |
/// |---------|------------------------------|
/// | 0       | `Scene` uniform (planes)     |
/// | 1       | `CullParams` uniform         |
/// | 2       | bounds, read-only storage    |
/// | 3       | source instances, read-only  |
/// | 4       | compacted instances, rw      |
/// | 5       | cull counters, rw (atomic)   |
pub fn culling_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let cs = wgpu::ShaderStages::COMPUTE;
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Layout: Culling"),
        entries: &[
            uniform_entry(0, cs),
            uniform_entry(1, cs),
            storage_entry(2, true),
            storage_entry(3, true),
            storage_entry(4, false),
            storage_entry(5, false),
        ],
    })
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
