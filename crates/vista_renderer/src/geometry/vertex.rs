/// GPU vertex type for the built-in meshes.
///
/// Position and normal are contiguous `vec3<f32>` fields so `bytemuck` can
/// reinterpret the slice as bytes.  The matching WGSL locations are declared
/// in `assets/shaders/instanced.wgsl`; the per-instance attributes start at
/// location 4.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space unit normal.
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];

    /// Returns the `VertexBufferLayout` for slot 0 of the instanced pipeline.
    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
