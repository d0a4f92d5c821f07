/*!
# Nebula GL

Core resource layer for OpenGL-style rendering.

This crate wraps a graphics driver behind the `GraphicsDevice` trait and builds
safe, owning resources on top of it. Every driver call can be routed through an
error guard that drains the driver's error queue and turns any reported code into
an `Error` carrying the call expression and its source location.

## Architecture

- **GraphicsDevice**: Driver entry points (implemented by `MockDevice` here and by
  the `nebula_gl_renderer_glow` backend)
- **GpuContext**: Shared driver access plus `Config`
- **ErrorGuard**: `checked_call` and the `gl_call!` macro
- **GpuBuffer / IndexBuffer**: Owned vertex and index buffers
- **ShaderProgramSource**: Splits a combined `#shader vertex` / `#shader fragment` file
- **ShaderProgramBuilder / ShaderProgram**: Compile, link, validate and own a program

Resources hold an `Rc<GpuContext>` and therefore stay on the thread that owns the
GL context.
*/

// Internal modules
mod error;
mod config;
mod diagnostics;
pub mod log;
pub mod device;
pub mod guard;
pub mod buffer;
pub mod shader;

// Main nebula namespace module
pub mod nebula {
    // Error types
    pub use crate::error::{Error, ProgramPhase, Result};

    // Configuration
    pub use crate::config::{CompileFailurePolicy, Config, ValidationPolicy};

    // Global logger facade
    pub use crate::diagnostics::Diagnostics;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Driver abstraction and shared context
    pub mod device {
        pub use crate::device::*;
    }

    // Checked driver calls
    pub mod guard {
        pub use crate::guard::*;
    }

    // Buffers
    pub mod buffer {
        pub use crate::buffer::*;
    }

    // Shader sources and programs
    pub mod shader {
        pub use crate::shader::*;
    }
}
