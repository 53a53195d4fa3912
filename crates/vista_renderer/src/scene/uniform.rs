//! Per-frame scene constants and the GPU resources that hold them.
//!
//! `SceneUniform` is read by the instanced pipeline (group 0) and by the
//! culling kernel, so both culling paths classify against the exact plane
//! data the frame was rendered with.
use std::sync::Arc;

use vista_core::{Frustum, OrbitCamera};

use crate::resources::buffer;

/// `struct Scene` in `instanced.wgsl` and `cull.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position, `w = 1`.
    pub camera_pos: [f32; 4],
    /// near, far, left, right, top, bottom as `(normal, d)`.
    pub frustum: [[f32; 4]; 6],
}

impl SceneUniform {
    pub fn new(camera: &OrbitCamera, frustum: &Frustum) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_pos: camera.eye().extend(1.0).to_array(),
            frustum: frustum.to_gpu(),
        }
    }
}

pub struct GpuScene {
    pub uniform: SceneUniform,
    pub buffer: Arc<wgpu::Buffer>,
    pub bind_group: Arc<wgpu::BindGroup>,
}

impl GpuScene {
    /// `layout` must have a single `UNIFORM` entry at binding 0.
    pub fn new(
        device: &wgpu::Device,
        camera: &OrbitCamera,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let uniform = SceneUniform::new(camera, &camera.frustum());
        let buf = buffer::create_uniform(device, "Scene Uniform Buffer", &uniform);

        let bind_group = Arc::new(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buf.as_entire_binding(),
            }],
        }));

        Self {
            uniform,
            buffer: buf,
            bind_group,
        }
    }

    /// Writes this frame's camera and planes.  Call before any culling or
    /// render work is recorded.
    pub fn sync(&mut self, queue: &wgpu::Queue, camera: &OrbitCamera, frustum: &Frustum) {
        self.uniform = SceneUniform::new(camera, frustum);
        buffer::update_uniform(queue, &self.buffer, &self.uniform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_wgsl_struct_size() {
        assert_eq!(std::mem::size_of::<SceneUniform>(), 176);
    }

    #[test]
    fn carries_the_planes_in_order() {
        let camera = OrbitCamera::default();
        let frustum = camera.frustum();
        let u = SceneUniform::new(&camera, &frustum);
        for (row, plane) in u.frustum.iter().zip(frustum.planes()) {
            assert_eq!(*row, plane.to_array());
        }
        assert_eq!(u.camera_pos[3], 1.0);
    }
}
