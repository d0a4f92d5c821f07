/// GraphicsDevice trait - the raw driver calls the core is built on
///
/// The trait mirrors the OpenGL entry points one to one so that every call
/// can be wrapped individually by the error guard. Handles are the driver's
/// raw object names; `0` never names a live object.

use std::fmt;

/// Raw driver object name (buffer, shader or program)
pub type RawHandle = u32;

/// The "no object" handle
pub const NULL_HANDLE: RawHandle = 0;

/// Value returned by get_error when the queue is empty
pub const GL_NO_ERROR: u32 = 0;

/// Buffer binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data (GL_ARRAY_BUFFER)
    Vertex,
    /// Element indices (GL_ELEMENT_ARRAY_BUFFER)
    Index,
}

impl fmt::Display for BufferTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferTarget::Vertex => write!(f, "vertex"),
            BufferTarget::Index => write!(f, "index"),
        }
    }
}

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Decoded driver error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlErrorCode {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    StackOverflow,
    StackUnderflow,
    OutOfMemory,
    InvalidFramebufferOperation,
    ContextLost,
    /// Code outside the core error set (vendor extension)
    Unknown(u32),
}

impl GlErrorCode {
    pub const INVALID_ENUM: u32 = 0x0500;
    pub const INVALID_VALUE: u32 = 0x0501;
    pub const INVALID_OPERATION: u32 = 0x0502;
    pub const STACK_OVERFLOW: u32 = 0x0503;
    pub const STACK_UNDERFLOW: u32 = 0x0504;
    pub const OUT_OF_MEMORY: u32 = 0x0505;
    pub const INVALID_FRAMEBUFFER_OPERATION: u32 = 0x0506;
    pub const CONTEXT_LOST: u32 = 0x0507;

    /// Decode a get_error value; `None` for GL_NO_ERROR
    pub fn from_raw(raw: u32) -> Option<Self> {
        let code = match raw {
            GL_NO_ERROR => return None,
            Self::INVALID_ENUM => GlErrorCode::InvalidEnum,
            Self::INVALID_VALUE => GlErrorCode::InvalidValue,
            Self::INVALID_OPERATION => GlErrorCode::InvalidOperation,
            Self::STACK_OVERFLOW => GlErrorCode::StackOverflow,
            Self::STACK_UNDERFLOW => GlErrorCode::StackUnderflow,
            Self::OUT_OF_MEMORY => GlErrorCode::OutOfMemory,
            Self::INVALID_FRAMEBUFFER_OPERATION => GlErrorCode::InvalidFramebufferOperation,
            Self::CONTEXT_LOST => GlErrorCode::ContextLost,
            other => GlErrorCode::Unknown(other),
        };
        Some(code)
    }

    /// Raw numeric value
    pub fn to_raw(self) -> u32 {
        match self {
            GlErrorCode::InvalidEnum => Self::INVALID_ENUM,
            GlErrorCode::InvalidValue => Self::INVALID_VALUE,
            GlErrorCode::InvalidOperation => Self::INVALID_OPERATION,
            GlErrorCode::StackOverflow => Self::STACK_OVERFLOW,
            GlErrorCode::StackUnderflow => Self::STACK_UNDERFLOW,
            GlErrorCode::OutOfMemory => Self::OUT_OF_MEMORY,
            GlErrorCode::InvalidFramebufferOperation => Self::INVALID_FRAMEBUFFER_OPERATION,
            GlErrorCode::ContextLost => Self::CONTEXT_LOST,
            GlErrorCode::Unknown(raw) => raw,
        }
    }

    /// Symbolic name as it appears in the GL headers
    pub fn name(self) -> &'static str {
        match self {
            GlErrorCode::InvalidEnum => "GL_INVALID_ENUM",
            GlErrorCode::InvalidValue => "GL_INVALID_VALUE",
            GlErrorCode::InvalidOperation => "GL_INVALID_OPERATION",
            GlErrorCode::StackOverflow => "GL_STACK_OVERFLOW",
            GlErrorCode::StackUnderflow => "GL_STACK_UNDERFLOW",
            GlErrorCode::OutOfMemory => "GL_OUT_OF_MEMORY",
            GlErrorCode::InvalidFramebufferOperation => "GL_INVALID_FRAMEBUFFER_OPERATION",
            GlErrorCode::ContextLost => "GL_CONTEXT_LOST",
            GlErrorCode::Unknown(_) => "GL_UNKNOWN_ERROR",
        }
    }

    /// Comma-separated list, e.g. "GL_INVALID_ENUM (0x0500), GL_INVALID_VALUE (0x0501)"
    pub fn join(codes: &[GlErrorCode]) -> String {
        codes.iter()
            .map(|code| code.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for GlErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#06x})", self.name(), self.to_raw())
    }
}

/// Raw driver interface
///
/// Implemented by backends (e.g., GlowDevice) and by MockDevice for tests.
/// Calls follow GL semantics: they never fail directly, they push codes onto
/// the driver error queue, which is read back with `get_error`.
/// All calls must happen on the thread that owns the context.
pub trait GraphicsDevice {
    /// Driver version string (GL_VERSION)
    fn version(&self) -> String;

    /// Pop one code from the driver error queue (GL_NO_ERROR when empty)
    fn get_error(&self) -> u32;

    // ===== BUFFERS =====

    /// Generate a buffer object name (0 on failure)
    fn gen_buffer(&self) -> RawHandle;

    /// Bind `buffer` to `target` (0 clears the binding)
    fn bind_buffer(&self, target: BufferTarget, buffer: RawHandle);

    /// Upload `data` into the buffer bound to `target` with a static-draw usage hint
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);

    /// Read `dst.len()` bytes starting at `offset` from the buffer bound to `target`
    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, dst: &mut [u8]);

    /// Delete a buffer object (0 is ignored)
    fn delete_buffer(&self, buffer: RawHandle);

    // ===== SHADERS =====

    /// Create a shader object (0 on failure)
    fn create_shader(&self, stage: ShaderStage) -> RawHandle;

    /// Replace the shader's source with a single string
    fn shader_source(&self, shader: RawHandle, source: &str);

    fn compile_shader(&self, shader: RawHandle);

    /// GL_COMPILE_STATUS
    fn get_shader_compile_status(&self, shader: RawHandle) -> bool;

    /// Compiler info log (sized by GL_INFO_LOG_LENGTH)
    fn get_shader_info_log(&self, shader: RawHandle) -> String;

    /// Delete a shader object (0 is ignored)
    fn delete_shader(&self, shader: RawHandle);

    // ===== PROGRAMS =====

    /// Create a program object (0 on failure)
    fn create_program(&self) -> RawHandle;

    fn attach_shader(&self, program: RawHandle, shader: RawHandle);

    fn link_program(&self, program: RawHandle);

    /// GL_LINK_STATUS
    fn get_program_link_status(&self, program: RawHandle) -> bool;

    fn validate_program(&self, program: RawHandle);

    /// GL_VALIDATE_STATUS
    fn get_program_validate_status(&self, program: RawHandle) -> bool;

    /// Linker/validator info log
    fn get_program_info_log(&self, program: RawHandle) -> String;

    /// Make `program` current (0 unbinds)
    fn use_program(&self, program: RawHandle);

    /// Uniform location, -1 when the program has no active uniform `name`
    fn get_uniform_location(&self, program: RawHandle, name: &str) -> i32;

    /// Set a vec4 uniform on the current program (-1 is silently ignored)
    fn uniform_4f(&self, location: i32, value: [f32; 4]);

    /// Delete a program object (0 is ignored)
    fn delete_program(&self, program: RawHandle);
}
