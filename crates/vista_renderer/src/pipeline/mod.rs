pub mod compute;
pub mod instanced;
pub mod layout;

pub use compute::ComputePipeline;
pub use instanced::InstancedPipeline;
pub use layout::{culling_layout, PipelineLayouts};
