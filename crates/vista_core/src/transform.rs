//! Placement of one instance: position, rotation (quaternion), scale.
//!
//! `Transform` is `Copy` and `Default`.  Call `.matrix()` for the
//! local-to-world matrix and `.normal_matrix()` for the matrix that carries
//! normals (inverse-transpose of the upper 3×3, embedded in a 4×4 so it can
//! share the instance buffer layout).

use glam::{Mat3, Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World-space position (the centre the instance spins about).
    pub position: Vec3,
    /// Orientation as a unit quaternion.
    pub rotation: Quat,
    /// Non-uniform scale factor.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Construct with a world-space position, identity rotation and scale.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Builder-style uniform scale.
    pub fn with_scale(mut self, s: f32) -> Self {
        self.scale = Vec3::splat(s);
        self
    }

    /// Builder-style rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Build the TRS model matrix (`T * R * S`).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Inverse-transpose of the upper 3×3 of [`Transform::matrix`].
    ///
    /// Degenerate scales (a zero axis) fall back to the identity instead of
    /// producing NaNs.
    pub fn normal_matrix(&self) -> Mat4 {
        normal_matrix(&self.matrix())
    }

    /// This transform spun by `angle` radians around the world Y axis through
    /// its own position.
    pub fn spun_y(&self, angle: f32) -> Self {
        Self {
            rotation: Quat::from_rotation_y(angle) * self.rotation,
            ..*self
        }
    }
}

/// Inverse-transpose of the upper 3×3 of `model`, as a 4×4.
pub fn normal_matrix(model: &Mat4) -> Mat4 {
    let m = Mat3::from_mat4(*model);
    if m.determinant().abs() < f32::EPSILON {
        return Mat4::IDENTITY;
    }
    Mat4::from_mat3(m.inverse().transpose())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_matrix() {
        let t = Transform::default();
        assert!(t.matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
        assert!(t.normal_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn translation_only() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let (_, _, pos) = t.matrix().to_scale_rotation_translation();
        assert!((pos - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
        // translation never leaks into the normal matrix
        assert!(t.normal_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let mut t = Transform::IDENTITY;
        t.scale = Vec3::new(2.0, 1.0, 1.0);
        let n = t.normal_matrix();
        // a normal along +X must shrink by the inverse of the scale
        let v = n.transform_vector3(Vec3::X);
        assert!((v - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn spin_keeps_position() {
        let t = Transform::from_position(Vec3::new(4.0, 0.0, -2.0));
        let spun = t.spun_y(1.3);
        assert_eq!(spun.position, t.position);
        let (_, _, pos) = spun.matrix().to_scale_rotation_translation();
        assert!((pos - t.position).length() < 1e-5);
    }

    #[test]
    fn degenerate_scale_falls_back_to_identity() {
        let t = Transform::IDENTITY.with_scale(0.0);
        assert_eq!(t.normal_matrix(), Mat4::IDENTITY);
    }
}
