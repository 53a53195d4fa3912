pub mod compute_pass;
pub mod instanced_pass;

pub use compute_pass::ComputePass;
pub use instanced_pass::InstancedPass;
