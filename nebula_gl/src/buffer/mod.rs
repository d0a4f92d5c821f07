/// Buffer module - owned vertex and index buffers

pub mod gpu_buffer;

pub use gpu_buffer::*;
