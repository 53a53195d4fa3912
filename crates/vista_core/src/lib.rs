//! `vista_core`: CPU-side state for the culling demo.
//!
//! # Module layout
//!
//! | Module      | Responsibility                                          |
//! |-------------|---------------------------------------------------------|
//! | `transform` | Position / rotation / scale and derived matrices        |
//! | `camera`    | Orbit camera, view/projection, camera basis             |
//! | `culling`   | Frustum planes, AABBs, the positive-vertex classifier   |
//! | `instances` | Instance store, GPU instance/bounds layouts, compaction |
//! | `time`      | Frame clock and the global animation angle              |
//! | `context`   | Shared wgpu device/queue (feature `gpu`)                |
//! | `input`     | Keyboard / mouse state fed by winit (feature `input`)   |

pub mod camera;
pub mod culling;
pub mod instances;
pub mod time;
pub mod transform;

#[cfg(feature = "gpu")]
pub mod context;

#[cfg(feature = "input")]
pub mod input;

pub use camera::{CameraBasis, OrbitCamera};
pub use culling::{Aabb, Frustum, Plane};
pub use instances::{
    AabbRaw, Compaction, Instance, InstanceRaw, InstanceStore, Material, ScatterLayout,
};
pub use time::{FrameClock, FrameTime, Spin};
pub use transform::Transform;

#[cfg(feature = "input")]
pub use input::{InputState, KeyCode, MouseButton};

pub use glam;
