/// Shader module - combined source splitting and program building

pub mod shader_source;
pub mod shader_program;

pub use shader_source::*;
pub use shader_program::*;
