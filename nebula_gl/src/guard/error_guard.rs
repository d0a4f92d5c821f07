/// ErrorGuard - checked driver calls
///
/// GL reports errors through a poll-based queue instead of return values.
/// `checked_call` empties that queue before the call (so earlier failures are
/// not blamed on it), runs the call, then collects every code it raised.

use std::fmt;

use crate::device::{GlErrorCode, GraphicsDevice};
use crate::error::{Error, Result};
use crate::log::LogSeverity;
use crate::nebula::Diagnostics;

/// Upper bound on codes read from the queue in one drain.
/// A lost context keeps reporting GL_CONTEXT_LOST on every query.
pub const MAX_DRAINED_ERRORS: usize = 32;

/// Where a checked call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    /// The call expression as written
    pub expression: &'static str,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32, expression: &'static str) -> Self {
        Self { file, line, expression }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.expression, self.file, self.line)
    }
}

/// Read codes from the driver queue until it reports GL_NO_ERROR
pub fn drain_errors(device: &dyn GraphicsDevice) -> Vec<GlErrorCode> {
    let mut codes = Vec::new();
    while codes.len() < MAX_DRAINED_ERRORS {
        match GlErrorCode::from_raw(device.get_error()) {
            Some(code) => codes.push(code),
            None => break,
        }
    }
    codes
}

/// Run `call` against `device` and fail if it raised any driver error
///
/// Returns the call's own result untouched on success. On failure the codes are
/// logged at ERROR level against the call site and returned as
/// `Error::GpuCallFailed`; the caller decides whether that is fatal.
///
/// # Example
///
/// ```no_run
/// use nebula_gl::nebula::device::{BufferTarget, MockDevice};
/// use nebula_gl::nebula::guard::{checked_call, CallSite};
///
/// let device = MockDevice::new();
/// let site = CallSite::new(file!(), line!(), "gl.bind_buffer(Vertex, 0)");
/// checked_call(&device, site, |gl| gl.bind_buffer(BufferTarget::Vertex, 0))?;
/// # Ok::<(), nebula_gl::nebula::Error>(())
/// ```
pub fn checked_call<T, F>(device: &dyn GraphicsDevice, site: CallSite, call: F) -> Result<T>
where
    F: FnOnce(&dyn GraphicsDevice) -> T,
{
    let stale = drain_errors(device);
    if !stale.is_empty() {
        crate::nebula_warn!("nebula::ErrorGuard",
            "Discarded stale GL error(s) before {}: {}", site, GlErrorCode::join(&stale));
    }

    crate::nebula_trace!("nebula::ErrorGuard", "{}", site.expression);
    let value = call(device);

    let codes = drain_errors(device);
    if codes.is_empty() {
        return Ok(value);
    }

    Diagnostics::log_detailed(
        LogSeverity::Error,
        "nebula::ErrorGuard",
        format!("[OpenGL Error] {} raised {}", site.expression, GlErrorCode::join(&codes)),
        site.file,
        site.line,
    );

    Err(Error::GpuCallFailed {
        codes,
        expression: site.expression.to_string(),
        file: site.file,
        line: site.line,
    })
}

/// Run one driver call through a `GpuContext`, capturing file, line and expression
///
/// ```ignore
/// gl_call!(context, |gl| gl.bind_buffer(BufferTarget::Vertex, handle))?;
/// let linked = gl_call!(context, |gl| gl.get_program_link_status(program))?;
/// ```
#[macro_export]
macro_rules! gl_call {
    ($context:expr, |$gl:ident| $call:expr) => {
        $context.call(
            $crate::nebula::guard::CallSite::new(file!(), line!(), stringify!($call)),
            |$gl| $call,
        )
    };
}

/// Run one call against a bare `&dyn GraphicsDevice`, always checked
///
/// ```ignore
/// let handle = gl_check!(&device, |gl| gl.gen_buffer())?;
/// ```
#[macro_export]
macro_rules! gl_check {
    ($device:expr, |$gl:ident| $call:expr) => {
        $crate::nebula::guard::checked_call(
            $device,
            $crate::nebula::guard::CallSite::new(file!(), line!(), stringify!($call)),
            |$gl| $call,
        )
    };
}

#[cfg(test)]
#[path = "error_guard_tests.rs"]
mod tests;
