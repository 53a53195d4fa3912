pub mod uniform;

pub use uniform::{GpuScene, SceneUniform};
