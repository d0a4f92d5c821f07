//! Unit tests for the error guard
//!
//! Uses MockDevice so the driver error queue can be filled on demand.

use super::*;
use std::cell::Cell;

use crate::device::{BufferTarget, MockDevice, GL_NO_ERROR};
use crate::error::Error;

fn site() -> CallSite {
    CallSite::new("render.rs", 12, "gl.draw()")
}

/// A driver that never stops reporting errors (lost context)
struct LostContextDevice {
    queried: Cell<usize>,
    inner: MockDevice,
}

impl GraphicsDevice for LostContextDevice {
    fn version(&self) -> String { self.inner.version() }
    fn get_error(&self) -> u32 {
        self.queried.set(self.queried.get() + 1);
        GlErrorCode::CONTEXT_LOST
    }
    fn gen_buffer(&self) -> u32 { self.inner.gen_buffer() }
    fn bind_buffer(&self, target: BufferTarget, buffer: u32) { self.inner.bind_buffer(target, buffer) }
    fn buffer_data(&self, target: BufferTarget, data: &[u8]) { self.inner.buffer_data(target, data) }
    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, dst: &mut [u8]) {
        self.inner.get_buffer_sub_data(target, offset, dst)
    }
    fn delete_buffer(&self, buffer: u32) { self.inner.delete_buffer(buffer) }
    fn create_shader(&self, stage: crate::device::ShaderStage) -> u32 { self.inner.create_shader(stage) }
    fn shader_source(&self, shader: u32, source: &str) { self.inner.shader_source(shader, source) }
    fn compile_shader(&self, shader: u32) { self.inner.compile_shader(shader) }
    fn get_shader_compile_status(&self, shader: u32) -> bool { self.inner.get_shader_compile_status(shader) }
    fn get_shader_info_log(&self, shader: u32) -> String { self.inner.get_shader_info_log(shader) }
    fn delete_shader(&self, shader: u32) { self.inner.delete_shader(shader) }
    fn create_program(&self) -> u32 { self.inner.create_program() }
    fn attach_shader(&self, program: u32, shader: u32) { self.inner.attach_shader(program, shader) }
    fn link_program(&self, program: u32) { self.inner.link_program(program) }
    fn get_program_link_status(&self, program: u32) -> bool { self.inner.get_program_link_status(program) }
    fn validate_program(&self, program: u32) { self.inner.validate_program(program) }
    fn get_program_validate_status(&self, program: u32) -> bool { self.inner.get_program_validate_status(program) }
    fn get_program_info_log(&self, program: u32) -> String { self.inner.get_program_info_log(program) }
    fn use_program(&self, program: u32) { self.inner.use_program(program) }
    fn get_uniform_location(&self, program: u32, name: &str) -> i32 { self.inner.get_uniform_location(program, name) }
    fn uniform_4f(&self, location: i32, value: [f32; 4]) { self.inner.uniform_4f(location, value) }
    fn delete_program(&self, program: u32) { self.inner.delete_program(program) }
}

// ============================================================================
// SUCCESS PATH
// ============================================================================

#[test]
fn test_checked_call_passes_value_through() {
    let device = MockDevice::new();
    let handle = checked_call(&device, site(), |gl| gl.gen_buffer()).unwrap();
    assert_ne!(handle, 0);
    assert!(device.is_buffer(handle));
}

#[test]
fn test_checked_call_unit_result() {
    let device = MockDevice::new();
    let result: Result<()> = checked_call(&device, site(), |gl| gl.bind_buffer(BufferTarget::Vertex, 0));
    assert!(result.is_ok());
}

#[test]
fn test_checked_call_discards_stale_errors() {
    let device = MockDevice::new();
    device.push_error(GlErrorCode::InvalidEnum);
    device.push_error(GlErrorCode::InvalidValue);

    // The call itself is clean, so the stale codes must not be blamed on it
    let result = checked_call(&device, site(), |gl| gl.bind_buffer(BufferTarget::Vertex, 0));
    assert!(result.is_ok());
    assert_eq!(device.pending_errors(), 0);
}

// ============================================================================
// FAILURE PATH
// ============================================================================

#[test]
fn test_checked_call_reports_call_error() {
    let device = MockDevice::new();
    let result = checked_call(&device, site(), |gl| gl.bind_buffer(BufferTarget::Index, 1234));

    match result {
        Err(Error::GpuCallFailed { codes, expression, file, line }) => {
            assert_eq!(codes, vec![GlErrorCode::InvalidOperation]);
            assert_eq!(expression, "gl.draw()");
            assert_eq!(file, "render.rs");
            assert_eq!(line, 12);
        }
        other => panic!("expected GpuCallFailed, got {:?}", other),
    }
}

#[test]
fn test_checked_call_collects_every_code() {
    let device = MockDevice::new();
    let result = checked_call(&device, site(), |gl| {
        gl.buffer_data(BufferTarget::Vertex, &[1, 2, 3]);
        gl.bind_buffer(BufferTarget::Vertex, 77);
    });

    match result {
        Err(Error::GpuCallFailed { codes, .. }) => {
            assert_eq!(codes, vec![GlErrorCode::InvalidOperation, GlErrorCode::InvalidOperation]);
        }
        other => panic!("expected GpuCallFailed, got {:?}", other),
    }
    assert_eq!(device.get_error(), GL_NO_ERROR);
}

#[test]
fn test_drain_errors_is_bounded() {
    let device = LostContextDevice { queried: Cell::new(0), inner: MockDevice::new() };
    let codes = drain_errors(&device);

    assert_eq!(codes.len(), MAX_DRAINED_ERRORS);
    assert!(codes.iter().all(|code| *code == GlErrorCode::ContextLost));
    assert_eq!(device.queried.get(), MAX_DRAINED_ERRORS);
}

#[test]
fn test_checked_call_on_lost_context_fails() {
    let device = LostContextDevice { queried: Cell::new(0), inner: MockDevice::new() };
    let result = checked_call(&device, site(), |gl| gl.gen_buffer());
    assert!(matches!(result, Err(Error::GpuCallFailed { .. })));
}

// ============================================================================
// MACROS AND CALL SITES
// ============================================================================

#[test]
fn test_gl_check_macro_captures_call_site() {
    let device = MockDevice::new();
    let result = crate::gl_check!(&device, |gl| gl.delete_shader(999));

    match result {
        Err(Error::GpuCallFailed { expression, file, line, .. }) => {
            assert_eq!(expression, "gl.delete_shader(999)");
            assert!(file.ends_with("error_guard_tests.rs"));
            assert!(line > 0);
        }
        other => panic!("expected GpuCallFailed, got {:?}", other),
    }
}

#[test]
fn test_call_site_display() {
    assert_eq!(format!("{}", site()), "gl.draw() (render.rs:12)");
}

#[test]
fn test_error_code_decoding() {
    assert_eq!(GlErrorCode::from_raw(GL_NO_ERROR), None);
    assert_eq!(GlErrorCode::from_raw(0x0505), Some(GlErrorCode::OutOfMemory));
    assert_eq!(GlErrorCode::from_raw(0x9999), Some(GlErrorCode::Unknown(0x9999)));
    assert_eq!(GlErrorCode::Unknown(0x9999).to_raw(), 0x9999);
    assert_eq!(GlErrorCode::InvalidFramebufferOperation.to_raw(), 0x0506);
    assert_eq!(format!("{}", GlErrorCode::ContextLost), "GL_CONTEXT_LOST (0x0507)");
}
