/*!
# Nebula GL - glow Backend

OpenGL implementation of the `nebula_gl` driver trait.

This crate provides `GlowDevice`, a `GraphicsDevice` built on a loaded
`glow::Context`. Creating the window and the GL context is left to the caller
(glutin, sdl2, winit + glutin, ...); the context must be current on the thread
that uses the device.
*/

mod glow_device;

pub use glow_device::GlowDevice;

// Backend namespace, mirroring nebula_gl::nebula
pub mod nebula {
    pub use crate::glow_device::GlowDevice;
}
