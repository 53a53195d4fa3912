//! Orbit camera.
//!
//! The camera circles a point of interest at `radius`, positioned by an
//! azimuth `phi` and an elevation `theta`.  Mouse drag changes the angles,
//! the wheel changes the radius.  Everything else (view, projection, the
//! frustum used for culling) is derived on demand.
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, FRAC_PI_6, PI};

use glam::{Mat4, Vec3};

use crate::culling::Frustum;

/// Radians of orbit per window width of drag.
pub const DRAG_SENSITIVITY: f32 = PI;
/// Wheel units per unit of radius (one notch is 120 units).
pub const WHEEL_UNITS_PER_STEP: f32 = 100.0;
/// Closest the eye may get to the point of interest.
pub const MIN_RADIUS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub poi: Vec3,
    pub radius: f32,
    /// Azimuth, unrestricted.
    pub phi: f32,
    /// Elevation, kept in `[-π/2, π/2]`.
    pub theta: f32,
    pub fovy: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

/// World-space eye position plus an orthonormal right-handed basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub eye: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            poi: Vec3::ZERO,
            radius: 10.0,
            phi: FRAC_PI_4,
            theta: FRAC_PI_6,
            fovy: FRAC_PI_3,
            aspect: 16.0 / 9.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

impl OrbitCamera {
    /// Unit vector from the point of interest towards the eye.
    pub fn direction(&self) -> Vec3 {
        spherical(self.phi, self.theta)
    }

    pub fn eye(&self) -> Vec3 {
        self.poi + self.direction() * self.radius
    }

    pub fn basis(&self) -> CameraBasis {
        let dir = self.direction();
        let forward = -dir;
        // the up vector is the direction a quarter turn further in elevation,
        // orthogonal to `dir` for every phi/theta (no pole singularity)
        let up = spherical(self.phi, self.theta + FRAC_PI_2);
        let right = forward.cross(up).normalize();
        CameraBasis {
            eye: self.poi + dir * self.radius,
            forward,
            up,
            right,
        }
    }

    pub fn view(&self) -> Mat4 {
        let b = self.basis();
        Mat4::look_at_rh(b.eye, self.poi, b.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// The six culling planes for the current pose.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_basis(&self.basis(), self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Applies a pointer drag of `(dx, dy)` pixels in a window `width` pixels
    /// wide.
    pub fn drag(&mut self, dx: f32, dy: f32, width: u32) {
        if width == 0 {
            return;
        }
        let w = width as f32;
        self.phi -= dx / w * DRAG_SENSITIVITY;
        self.theta = (self.theta + dy / w * DRAG_SENSITIVITY).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Applies a wheel movement in wheel units (positive moves closer).
    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius - delta / WHEEL_UNITS_PER_STEP).max(MIN_RADIUS);
    }
}

fn spherical(phi: f32, theta: f32) -> Vec3 {
    Vec3::new(theta.cos() * phi.cos(), theta.sin(), theta.cos() * phi.sin())
}
