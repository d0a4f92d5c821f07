//! Error types for Nebula GL
//!
//! This module defines the error types returned by checked driver calls,
//! buffer management and the shader build pipeline.

use std::fmt;
use std::path::PathBuf;

use crate::device::{GlErrorCode, ShaderStage};

/// Result type for Nebula GL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Program build phase that reported a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramPhase {
    /// glLinkProgram did not produce a linked program
    Link,
    /// glValidateProgram reported the program cannot execute in the current state
    Validate,
}

impl fmt::Display for ProgramPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramPhase::Link => write!(f, "link"),
            ProgramPhase::Validate => write!(f, "validation"),
        }
    }
}

/// Nebula GL errors
#[derive(Debug, Clone)]
pub enum Error {
    /// A wrapped driver call left one or more codes in the error queue
    GpuCallFailed {
        /// Every code raised by the call, in queue order
        codes: Vec<GlErrorCode>,
        /// The call expression as written at the call site
        expression: String,
        /// Call site source file
        file: &'static str,
        /// Call site source line
        line: u32,
    },

    /// A shader stage failed to compile
    CompileFailed {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler info log
        log: String,
    },

    /// Shader source file is missing or unreadable
    SourceNotFound {
        /// Path that was requested
        path: PathBuf,
        /// I/O failure description
        reason: String,
    },

    /// Program failed to link, or failed validation under a fatal validation policy
    LinkOrValidateFailed {
        /// Phase that failed
        phase: ProgramPhase,
        /// Program info log
        log: String,
    },

    /// Uniform lookup returned -1 (unknown name or optimized out by the compiler)
    UnknownUniform(String),

    /// Driver refused to create a resource (returned handle 0)
    InvalidResource(String),

    /// Backend-specific error
    BackendError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::GpuCallFailed { codes, expression, file, line } => {
                write!(f, "GPU call failed: {} raised {} ({}:{})",
                    expression, GlErrorCode::join(codes), file, line)
            }
            Error::CompileFailed { stage, log } => {
                write!(f, "Failed to compile {} shader: {}", stage, log.trim_end())
            }
            Error::SourceNotFound { path, reason } => {
                write!(f, "Shader source not found: {} ({})", path.display(), reason)
            }
            Error::LinkOrValidateFailed { phase, log } => {
                write!(f, "Program {} failed: {}", phase, log.trim_end())
            }
            Error::UnknownUniform(name) => write!(f, "Unknown uniform: {}", name),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
