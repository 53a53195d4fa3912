use glam::{Vec3, Vec4};

/// Oriented plane `dot(normal, p) + d = 0`; the positive half-space is inside.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    #[inline]
    pub fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Plane through the quad `p0, p1, p2, p3`.
    ///
    /// The normal is `normalize(cross(p1 - p0, p3 - p0))`, so the winding of
    /// the corners decides which side is inside.  The offset is taken at the
    /// quad's centroid.
    pub fn from_quad(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let normal = (p1 - p0).cross(p3 - p0).normalize_or_zero();
        let centroid = (p0 + p1 + p2 + p3) * 0.25;
        Self {
            normal,
            d: -normal.dot(centroid),
        }
    }

    /// Builds a plane from raw `(a, b, c, d)` coefficients, normalising so
    /// that [`Plane::signed_distance`] is a true distance.
    pub fn from_coefficients(v: Vec4) -> Self {
        let normal = v.truncate();
        let len = normal.length();
        if len > 1e-6 {
            Self::new(normal / len, v.w / len)
        } else {
            Self::new(normal, v.w)
        }
    }

    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }

    /// `[nx, ny, nz, d]`, the layout used by the scene constant buffer.
    #[inline]
    pub fn to_array(&self) -> [f32; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_winding_sets_the_normal() {
        // counter-clockwise seen from +Z
        let p = Plane::from_quad(
            Vec3::new(-1.0, -1.0, 2.0),
            Vec3::new(1.0, -1.0, 2.0),
            Vec3::new(1.0, 1.0, 2.0),
            Vec3::new(-1.0, 1.0, 2.0),
        );
        assert!((p.normal - Vec3::Z).length() < 1e-6);
        assert!((p.d + 2.0).abs() < 1e-6);
        assert!(p.signed_distance(Vec3::new(0.0, 0.0, 3.0)) > 0.0);
        assert!(p.signed_distance(Vec3::ZERO) < 0.0);
    }

    #[test]
    fn normal_is_unit_length_for_large_quads() {
        let p = Plane::from_quad(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 50.0, 0.0),
            Vec3::new(50.0, 50.0, 0.0),
            Vec3::new(50.0, 0.0, 0.0),
        );
        assert!((p.normal.length() - 1.0).abs() < 1e-6);
        assert!((p.normal - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn coefficients_are_normalised() {
        let p = Plane::from_coefficients(Vec4::new(0.0, 3.0, 0.0, 6.0));
        assert_eq!(p.normal, Vec3::Y);
        assert_eq!(p.d, 2.0);
        assert_eq!(p.to_array(), [0.0, 1.0, 0.0, 2.0]);
    }
}
