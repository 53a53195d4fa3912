pub mod array_buffer;
pub mod buffer;
pub mod texture;

pub use array_buffer::ArrayBuffer;
