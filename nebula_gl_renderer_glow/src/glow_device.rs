/// GlowDevice - GraphicsDevice implemented on a loaded glow context
///
/// Every method is a thin wrapper over one `glow::HasContext` call. Object
/// names cross the trait boundary as raw `u32` values and are converted back
/// to glow's native handle types here; `0` maps to "no object".

use std::num::NonZeroU32;

use glow::HasContext;
use nebula_gl::nebula::device::{BufferTarget, GraphicsDevice, RawHandle, ShaderStage, NULL_HANDLE};
use nebula_gl::nebula::{Error, Result};

/// OpenGL driver backed by glow
pub struct GlowDevice {
    gl: glow::Context,
}

impl GlowDevice {
    /// Wrap a loaded glow context
    ///
    /// Fails with `Error::BackendError` when the context reports no GL_VERSION,
    /// which happens when the loader found no entry points or no context is
    /// current.
    ///
    /// # Safety
    ///
    /// The GL context `gl` was loaded from must stay current on the calling
    /// thread for as long as this device (and anything built on it) is used.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::rc::Rc;
    /// use nebula_gl::nebula::{Config, device::GpuContext};
    /// use nebula_gl_renderer_glow::GlowDevice;
    ///
    /// # fn load() -> glow::Context { unimplemented!() }
    /// let gl = load(); // glow::Context::from_loader_function(...)
    /// let device = unsafe { GlowDevice::new(gl)? };
    /// let context = GpuContext::new(Rc::new(device), Config::default());
    /// # Ok::<(), nebula_gl::nebula::Error>(())
    /// ```
    pub unsafe fn new(gl: glow::Context) -> Result<Self> {
        let version = gl.get_parameter_string(glow::VERSION);
        check_version(&version)?;
        nebula_gl::nebula_debug!("nebula::GlowDevice", "OpenGL {}", version);
        Ok(Self { gl })
    }

    /// Underlying glow context, for calls the trait does not cover
    pub fn context(&self) -> &glow::Context {
        &self.gl
    }
}

// ===== ENUM MAPPINGS =====

pub(crate) fn buffer_target_to_gl(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Vertex => glow::ARRAY_BUFFER,
        BufferTarget::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
}

pub(crate) fn shader_stage_to_gl(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

// ===== HANDLE CONVERSIONS =====

pub(crate) fn native_buffer(handle: RawHandle) -> Option<glow::NativeBuffer> {
    NonZeroU32::new(handle).map(glow::NativeBuffer)
}

pub(crate) fn native_shader(handle: RawHandle) -> Option<glow::NativeShader> {
    NonZeroU32::new(handle).map(glow::NativeShader)
}

pub(crate) fn native_program(handle: RawHandle) -> Option<glow::NativeProgram> {
    NonZeroU32::new(handle).map(glow::NativeProgram)
}

/// -1 for "no such uniform", as glGetUniformLocation reports it
pub(crate) fn uniform_location_to_raw(location: Option<glow::NativeUniformLocation>) -> i32 {
    match location {
        Some(location) => location.0 as i32,
        None => -1,
    }
}

pub(crate) fn raw_to_uniform_location(location: i32) -> Option<glow::NativeUniformLocation> {
    u32::try_from(location).ok().map(glow::NativeUniformLocation)
}

fn check_version(version: &str) -> Result<()> {
    if version.trim().is_empty() {
        nebula_gl::nebula_error!("nebula::GlowDevice", "Context reports no GL_VERSION");
        return Err(Error::BackendError("GL_VERSION is empty; is the context current?".to_string()));
    }
    Ok(())
}

fn created(kind: &str, result: std::result::Result<NonZeroU32, String>) -> RawHandle {
    match result {
        Ok(handle) => handle.get(),
        Err(message) => {
            nebula_gl::nebula_error!("nebula::GlowDevice", "Failed to create {}: {}", kind, message);
            NULL_HANDLE
        }
    }
}

// ===== DRIVER CALLS =====

impl GraphicsDevice for GlowDevice {
    fn version(&self) -> String {
        unsafe { self.gl.get_parameter_string(glow::VERSION) }
    }

    fn get_error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }

    fn gen_buffer(&self) -> RawHandle {
        let result = unsafe { self.gl.create_buffer() };
        created("buffer", result.map(|buffer| buffer.0))
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: RawHandle) {
        unsafe { self.gl.bind_buffer(buffer_target_to_gl(target), native_buffer(buffer)) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe { self.gl.buffer_data_u8_slice(buffer_target_to_gl(target), data, glow::STATIC_DRAW) }
    }

    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, dst: &mut [u8]) {
        // GL takes a signed offset; anything larger is an out-of-range read
        let offset = i32::try_from(offset).unwrap_or(i32::MAX);
        unsafe { self.gl.get_buffer_sub_data(buffer_target_to_gl(target), offset, dst) }
    }

    fn delete_buffer(&self, buffer: RawHandle) {
        if let Some(buffer) = native_buffer(buffer) {
            unsafe { self.gl.delete_buffer(buffer) }
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> RawHandle {
        let result = unsafe { self.gl.create_shader(shader_stage_to_gl(stage)) };
        created("shader", result.map(|shader| shader.0))
    }

    fn shader_source(&self, shader: RawHandle, source: &str) {
        if let Some(shader) = native_shader(shader) {
            unsafe { self.gl.shader_source(shader, source) }
        }
    }

    fn compile_shader(&self, shader: RawHandle) {
        if let Some(shader) = native_shader(shader) {
            unsafe { self.gl.compile_shader(shader) }
        }
    }

    fn get_shader_compile_status(&self, shader: RawHandle) -> bool {
        native_shader(shader)
            .map(|shader| unsafe { self.gl.get_shader_compile_status(shader) })
            .unwrap_or(false)
    }

    fn get_shader_info_log(&self, shader: RawHandle) -> String {
        native_shader(shader)
            .map(|shader| unsafe { self.gl.get_shader_info_log(shader) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: RawHandle) {
        if let Some(shader) = native_shader(shader) {
            unsafe { self.gl.delete_shader(shader) }
        }
    }

    fn create_program(&self) -> RawHandle {
        let result = unsafe { self.gl.create_program() };
        created("program", result.map(|program| program.0))
    }

    fn attach_shader(&self, program: RawHandle, shader: RawHandle) {
        if let (Some(program), Some(shader)) = (native_program(program), native_shader(shader)) {
            unsafe { self.gl.attach_shader(program, shader) }
        }
    }

    fn link_program(&self, program: RawHandle) {
        if let Some(program) = native_program(program) {
            unsafe { self.gl.link_program(program) }
        }
    }

    fn get_program_link_status(&self, program: RawHandle) -> bool {
        native_program(program)
            .map(|program| unsafe { self.gl.get_program_link_status(program) })
            .unwrap_or(false)
    }

    fn validate_program(&self, program: RawHandle) {
        if let Some(program) = native_program(program) {
            unsafe { self.gl.validate_program(program) }
        }
    }

    fn get_program_validate_status(&self, program: RawHandle) -> bool {
        native_program(program)
            .map(|program| unsafe { self.gl.get_program_validate_status(program) })
            .unwrap_or(false)
    }

    fn get_program_info_log(&self, program: RawHandle) -> String {
        native_program(program)
            .map(|program| unsafe { self.gl.get_program_info_log(program) })
            .unwrap_or_default()
    }

    fn use_program(&self, program: RawHandle) {
        unsafe { self.gl.use_program(native_program(program)) }
    }

    fn get_uniform_location(&self, program: RawHandle, name: &str) -> i32 {
        let location = native_program(program)
            .and_then(|program| unsafe { self.gl.get_uniform_location(program, name) });
        uniform_location_to_raw(location)
    }

    fn uniform_4f(&self, location: i32, value: [f32; 4]) {
        let location = raw_to_uniform_location(location);
        let [x, y, z, w] = value;
        unsafe { self.gl.uniform_4_f32(location.as_ref(), x, y, z, w) }
    }

    fn delete_program(&self, program: RawHandle) {
        if let Some(program) = native_program(program) {
            unsafe { self.gl.delete_program(program) }
        }
    }
}

#[cfg(test)]
#[path = "glow_device_tests.rs"]
mod tests;
