use glam::Mat4;

use crate::culling::Aabb;
use crate::transform::Transform;

/// Surface parameters carried per instance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub shininess: f32,
    pub uses_normal_map: bool,
    /// Index into the material palette / texture array.
    pub index: u32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shininess: 64.0,
            uses_normal_map: true,
            index: 0,
        }
    }
}

/// One drawable copy of the cube mesh.
#[derive(Clone, Debug)]
pub struct Instance {
    /// Placement at animation angle 0.
    pub placement: Transform,
    pub material: Material,
    /// Spins around +Y with the global animation angle.
    pub animated: bool,
    /// Result of the last CPU classification.
    pub visible: bool,
    local_to_world: Mat4,
    normal_matrix: Mat4,
}

impl Instance {
    pub fn new(placement: Transform, material: Material) -> Self {
        Self {
            placement,
            material,
            animated: false,
            visible: false,
            local_to_world: placement.matrix(),
            normal_matrix: placement.normal_matrix(),
        }
    }

    pub fn animated(mut self) -> Self {
        self.animated = true;
        self
    }

    #[inline]
    pub fn local_to_world(&self) -> Mat4 {
        self.local_to_world
    }

    #[inline]
    pub fn normal_matrix(&self) -> Mat4 {
        self.normal_matrix
    }

    /// Recomputes both matrices for the placement spun by `angle`.
    pub fn set_angle(&mut self, angle: f32) {
        let t = self.placement.spun_y(angle);
        self.local_to_world = t.matrix();
        self.normal_matrix = t.normal_matrix();
    }

    /// World-space bounds of `local` under the base placement.
    pub fn placed_bounds(&self, local: &Aabb) -> Aabb {
        local.transform(&self.placement.matrix())
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.local_to_world.to_cols_array_2d(),
            normal: self.normal_matrix.to_cols_array_2d(),
            params: [
                self.material.shininess,
                if self.material.uses_normal_map { 1.0 } else { 0.0 },
                self.material.index as f32,
                if self.visible { 1.0 } else { 0.0 },
            ],
        }
    }
}

/// GPU layout of one instance, shared by the vertex stage and the culling
/// kernel.
///
/// `params` = (shininess, normal-map flag, material index, visible flag).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub params: [f32; 4],
}

impl InstanceRaw {
    /// World-space translation column of `model`.
    #[inline]
    pub fn translation(&self) -> [f32; 3] {
        let t = self.model[3];
        [t[0], t[1], t[2]]
    }
}

#[cfg(feature = "gpu")]
impl InstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 9] = wgpu::vertex_attr_array![
        // model matrix columns
        4 => Float32x4, 5 => Float32x4, 6 => Float32x4, 7 => Float32x4,
        // normal matrix columns
        8 => Float32x4, 9 => Float32x4, 10 => Float32x4, 11 => Float32x4,
        // params
        12 => Float32x4,
    ];

    /// Per-instance vertex buffer layout (locations 4..=12).
    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// GPU layout of one world-space AABB (`w` unused).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AabbRaw {
    pub min: [f32; 4],
    pub max: [f32; 4],
}

impl From<&Aabb> for AabbRaw {
    fn from(b: &Aabb) -> Self {
        Self {
            min: b.min.extend(0.0).to_array(),
            max: b.max.extend(0.0).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn layouts_match_the_shaders() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 144);
        assert_eq!(std::mem::size_of::<AabbRaw>(), 32);
    }

    #[test]
    fn raw_packs_metadata() {
        let mut inst = Instance::new(
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
            Material {
                shininess: 32.0,
                uses_normal_map: false,
                index: 2,
            },
        );
        inst.visible = true;
        let raw = inst.to_raw();
        assert_eq!(raw.params, [32.0, 0.0, 2.0, 1.0]);
        assert_eq!(raw.translation(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn set_angle_rotates_in_place() {
        let mut inst = Instance::new(Transform::from_position(Vec3::new(5.0, 0.0, 0.0)), Material::default());
        inst.set_angle(std::f32::consts::FRAC_PI_2);
        let m = inst.local_to_world();
        assert_eq!(m.w_axis.truncate(), Vec3::new(5.0, 0.0, 0.0));
        // +X of the cube now points along -Z
        assert!((m.transform_vector3(Vec3::X) - Vec3::NEG_Z).length() < 1e-6);
        // pure rotation: the normal matrix equals the model's rotation part
        let n = inst.normal_matrix();
        assert!((n.transform_vector3(Vec3::X) - Vec3::NEG_Z).length() < 1e-5);
    }
}
