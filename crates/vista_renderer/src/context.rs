//! The renderer receives an already-initialised `EngineContext`; adapter and
//! surface setup live in `vista_core` and `vista_app`.
pub use vista_core::context::{ContextError, EngineContext};
