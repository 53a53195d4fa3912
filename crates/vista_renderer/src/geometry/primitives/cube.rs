//! Unit cube primitive centred at the origin.
//!
//! Matches `vista_core::Aabb::unit_cube()`, the local bounds every instance
//! AABB is derived from.  24 vertices (4 per face, so each face carries its
//! own normal) and 36 indices, counter-clockwise when seen from outside.
use crate::geometry::{Mesh, Vertex};
use crate::resources::buffer;

const H: f32 = 0.5;

/// CPU-side vertex and index data of the cube.
pub fn cube_data() -> (Vec<Vertex>, Vec<u16>) {
    // (normal, four corners in CCW order seen from outside)
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([ 0.0,  0.0,  1.0], [[-H, -H,  H], [ H, -H,  H], [ H,  H,  H], [-H,  H,  H]]),
        ([ 0.0,  0.0, -1.0], [[ H, -H, -H], [-H, -H, -H], [-H,  H, -H], [ H,  H, -H]]),
        ([ 1.0,  0.0,  0.0], [[ H, -H,  H], [ H, -H, -H], [ H,  H, -H], [ H,  H,  H]]),
        ([-1.0,  0.0,  0.0], [[-H, -H, -H], [-H, -H,  H], [-H,  H,  H], [-H,  H, -H]]),
        ([ 0.0,  1.0,  0.0], [[-H,  H,  H], [ H,  H,  H], [ H,  H, -H], [-H,  H, -H]]),
        ([ 0.0, -1.0,  0.0], [[-H, -H, -H], [ H, -H, -H], [ H, -H,  H], [-H, -H,  H]]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u16;
        vertices.extend(corners.iter().map(|&position| Vertex { position, normal }));
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

pub fn cube(device: &wgpu::Device) -> Mesh {
    let (vertices, indices) = cube_data();
    Mesh {
        vertex_buffer: buffer::create_vertex(device, "Cube VB", &vertices),
        index_buffer: buffer::create_index(device, "Cube IB", &indices),
        index_count: indices.len() as u32,
        index_format: wgpu::IndexFormat::Uint16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn counts() {
        let (v, i) = cube_data();
        assert_eq!(v.len(), 24);
        assert_eq!(i.len(), 36);
        assert!(i.iter().all(|&idx| (idx as usize) < v.len()));
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let (v, i) = cube_data();
        for tri in i.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|k| Vec3::from(v[k as usize].position));
            let face_normal = (b - a).cross(c - a).normalize();
            let declared = Vec3::from(v[tri[0] as usize].normal);
            assert!(face_normal.dot(declared) > 0.99, "{face_normal} vs {declared}");
        }
    }

    #[test]
    fn fits_the_unit_cube_bounds() {
        let (v, _) = cube_data();
        let bounds = vista_core::Aabb::unit_cube();
        for vert in v {
            let p = Vec3::from(vert.position);
            assert_eq!(p.abs(), Vec3::splat(0.5));
            assert!(p.cmpge(bounds.min).all() && p.cmple(bounds.max).all());
        }
    }
}
