//! View frustum as six inward-facing planes.
//!
//! ## Construction
//!
//! [`Frustum::from_basis`] is the primary path: it builds the four near and
//! four far corners from the camera basis with half-angle tangent scaling and
//! turns each face into a plane with [`Plane::from_quad`].  The corner order
//! handed to `from_quad` is fixed per face so that every normal points into
//! the frustum:
//!
//! ```text
//! near   (nbl, ntl, ntr, nbr)      far    (fbl, fbr, ftr, ftl)
//! left   (nbl, fbl, ftl, ntl)      right  (nbr, ntr, ftr, fbr)
//! top    (ntl, ftl, ftr, ntr)      bottom (nbl, nbr, fbr, fbl)
//! ```
//!
//! [`Frustum::from_view_proj`] extracts the same region analytically from a
//! combined matrix (Gribb-Hartmann) and is kept as an independent check.
use glam::{Mat4, Vec3, Vec4};

use super::{Aabb, Plane};
use crate::camera::CameraBasis;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    pub const NEAR: usize = 0;
    pub const FAR: usize = 1;
    pub const LEFT: usize = 2;
    pub const RIGHT: usize = 3;
    pub const TOP: usize = 4;
    pub const BOTTOM: usize = 5;

    #[inline]
    pub fn from_planes(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Builds the frustum of a perspective camera.
    ///
    /// `fovy` is the full vertical field of view in radians, `aspect` is
    /// width / height.
    pub fn from_basis(basis: &CameraBasis, fovy: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        let tan_y = (fovy * 0.5).tan();
        let tan_x = tan_y * aspect;

        let corner = |dist: f32, sx: f32, sy: f32| {
            basis.eye
                + basis.forward * dist
                + basis.right * (sx * dist * tan_x)
                + basis.up * (sy * dist * tan_y)
        };

        let nbl = corner(znear, -1.0, -1.0);
        let nbr = corner(znear, 1.0, -1.0);
        let ntl = corner(znear, -1.0, 1.0);
        let ntr = corner(znear, 1.0, 1.0);
        let fbl = corner(zfar, -1.0, -1.0);
        let fbr = corner(zfar, 1.0, -1.0);
        let ftl = corner(zfar, -1.0, 1.0);
        let ftr = corner(zfar, 1.0, 1.0);

        Self {
            planes: [
                Plane::from_quad(nbl, ntl, ntr, nbr),
                Plane::from_quad(fbl, fbr, ftr, ftl),
                Plane::from_quad(nbl, fbl, ftl, ntl),
                Plane::from_quad(nbr, ntr, ftr, fbr),
                Plane::from_quad(ntl, ftl, ftr, ntr),
                Plane::from_quad(nbl, nbr, fbr, fbl),
            ],
        }
    }

    /// Extracts the planes from `view_proj` for wgpu's `[0, 1]` depth range.
    pub fn from_view_proj(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let plane = |v: Vec4| Plane::from_coefficients(v);
        Self {
            planes: [
                plane(r2),
                plane(r3 - r2),
                plane(r3 + r0),
                plane(r3 - r0),
                plane(r3 - r1),
                plane(r3 + r1),
            ],
        }
    }

    #[inline]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Planes as `vec4(normal, d)` in near, far, left, right, top, bottom order.
    pub fn to_gpu(&self) -> [[f32; 4]; 6] {
        self.planes.map(|p| p.to_array())
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance(p) >= 0.0)
    }

    /// Returns `true` unless the box is entirely behind one of the planes.
    ///
    /// Conservative: boxes near the frustum's edges may be reported visible
    /// even though they are outside, never the other way round.  Stops at
    /// the first plane that rejects the box.
    #[inline]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| aabb.reaches(plane))
    }
}
