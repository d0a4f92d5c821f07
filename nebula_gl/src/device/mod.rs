/// Device module - driver abstraction and the shared GPU context

pub mod graphics_device;
pub mod gpu_context;
pub mod mock_device;

pub use graphics_device::*;
pub use gpu_context::*;

// No-GPU driver used by tests and tooling
pub use mock_device::MockDevice;
