//! Frustum culling math shared by both culling paths.
//!
//! ## Conventions
//!
//! A plane is `(normal, d)` and a point `p` is **inside** when
//! `dot(normal, p) + d >= 0`.  A frustum is six such planes in the fixed
//! order near, far, left, right, top, bottom; every normal points into the
//! frustum.  The GPU kernel receives the same planes as `vec4(normal, d)`,
//! so the CPU and GPU classifiers evaluate identical data.
//!
//! An AABB is culled when its *positive vertex* (the corner farthest along
//! the plane normal) is behind any plane.  A box touching a plane (distance
//! exactly 0) is kept.
pub mod aabb;
pub mod frustum;
pub mod plane;

pub use aabb::Aabb;
pub use frustum::Frustum;
pub use plane::Plane;
