//! Instances of the shared cube mesh and the per-frame compaction that
//! feeds the instanced draw.
pub mod instance;
pub mod store;

pub use instance::{AabbRaw, Instance, InstanceRaw, Material};
pub use store::{Compaction, InstanceStore, ScatterLayout};
