use glam::{Mat4, Vec3};

use super::Plane;

/// World-space axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Creates an AABB from `min`/`max` corners.
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of half-size `half` around `centre`.
    #[inline]
    pub fn from_centre(centre: Vec3, half: Vec3) -> Self {
        Self {
            min: centre - half,
            max: centre + half,
        }
    }

    /// Local bounds of the built-in cube mesh (edge length 1, centred at the origin).
    #[inline]
    pub fn unit_cube() -> Self {
        Self::from_centre(Vec3::ZERO, Vec3::splat(0.5))
    }

    #[inline]
    pub fn centre(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Returns the AABB enclosing this box after `transform`.
    ///
    /// Transforms the centre and rotates the half-extents through the
    /// absolute value of the upper 3×3 (Arvo, Graphics Gems 1990), which is
    /// exact for any affine transform and avoids the 8-corner loop.
    pub fn transform(&self, transform: &Mat4) -> Self {
        let centre = transform.transform_point3(self.centre());
        let half = self.half_extents();

        let x = transform.x_axis.truncate().abs();
        let y = transform.y_axis.truncate().abs();
        let z = transform.z_axis.truncate().abs();
        let new_half = x * half.x + y * half.y + z * half.z;

        Self::from_centre(centre, new_half)
    }

    /// The corner farthest along `normal`: per axis, `min` when the normal
    /// component is negative, `max` otherwise.
    #[inline]
    pub fn positive_vertex(&self, normal: Vec3) -> Vec3 {
        Vec3::new(
            if normal.x < 0.0 { self.min.x } else { self.max.x },
            if normal.y < 0.0 { self.min.y } else { self.max.y },
            if normal.z < 0.0 { self.min.z } else { self.max.z },
        )
    }

    /// `false` when the box lies entirely on the negative side of `plane`.
    #[inline]
    pub fn reaches(&self, plane: &Plane) -> bool {
        plane.signed_distance(self.positive_vertex(plane.normal)) >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn positive_vertex_follows_normal_signs() {
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(b.positive_vertex(Vec3::X), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(
            b.positive_vertex(Vec3::new(-1.0, 0.5, -0.2)),
            Vec3::new(-1.0, 1.0, -1.0)
        );
    }

    #[test]
    fn single_plane_inside_outside_and_touching() {
        // inside is x >= 0
        let plane = Plane::new(Vec3::X, 0.0);

        let straddling = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(straddling.positive_vertex(plane.normal).x, 1.0);
        assert!(straddling.reaches(&plane));

        let behind = Aabb::new(Vec3::new(-5.0, -1.0, -1.0), Vec3::new(-2.0, 1.0, 1.0));
        assert!(!behind.reaches(&plane));

        let touching = Aabb::new(Vec3::new(-3.0, -1.0, -1.0), Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(plane.signed_distance(touching.positive_vertex(plane.normal)), 0.0);
        assert!(touching.reaches(&plane));
    }

    #[test]
    fn translate_keeps_extent() {
        let b = Aabb::unit_cube().transform(&Mat4::from_translation(Vec3::new(3.0, 0.0, -1.0)));
        assert!((b.min - Vec3::new(2.5, -0.5, -1.5)).length() < 1e-6);
        assert!((b.max - Vec3::new(3.5, 0.5, -0.5)).length() < 1e-6);
    }

    #[test]
    fn rotation_grows_the_box() {
        let m = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4));
        let b = Aabb::unit_cube().transform(&m);
        let expected = 0.5 * std::f32::consts::SQRT_2;
        assert!((b.max.x - expected).abs() < 1e-5);
        assert!((b.max.z - expected).abs() < 1e-5);
        assert!((b.max.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn scale_is_applied() {
        let m = Mat4::from_scale(Vec3::new(2.0, 1.0, 4.0));
        let b = Aabb::unit_cube().transform(&m);
        assert_eq!(b.max, Vec3::new(1.0, 0.5, 2.0));
        assert_eq!(b.min, Vec3::new(-1.0, -0.5, -2.0));
    }
}
