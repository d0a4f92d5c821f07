//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use std::path::PathBuf;

use crate::device::{GlErrorCode, ShaderStage};
use crate::error::{Error, ProgramPhase, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_gpu_call_failed_display() {
    let err = Error::GpuCallFailed {
        codes: vec![GlErrorCode::InvalidEnum, GlErrorCode::InvalidValue],
        expression: "gl.bind_buffer(target, 7)".to_string(),
        file: "src/buffer/gpu_buffer.rs",
        line: 42,
    };
    let display = format!("{}", err);
    assert!(display.contains("GPU call failed"));
    assert!(display.contains("gl.bind_buffer(target, 7)"));
    assert!(display.contains("GL_INVALID_ENUM (0x0500)"));
    assert!(display.contains("GL_INVALID_VALUE (0x0501)"));
    assert!(display.contains("src/buffer/gpu_buffer.rs:42"));
}

#[test]
fn test_compile_failed_display() {
    let err = Error::CompileFailed {
        stage: ShaderStage::Fragment,
        log: "ERROR: 0:3: 'color' : undeclared identifier\n".to_string(),
    };
    let display = format!("{}", err);
    assert_eq!(
        display,
        "Failed to compile fragment shader: ERROR: 0:3: 'color' : undeclared identifier"
    );
}

#[test]
fn test_source_not_found_display() {
    let err = Error::SourceNotFound {
        path: PathBuf::from("res/shaders/Basic.shader"),
        reason: "No such file or directory".to_string(),
    };
    let display = format!("{}", err);
    assert!(display.contains("Shader source not found"));
    assert!(display.contains("Basic.shader"));
    assert!(display.contains("No such file or directory"));
}

#[test]
fn test_link_or_validate_failed_display() {
    let link = Error::LinkOrValidateFailed {
        phase: ProgramPhase::Link,
        log: "missing fragment stage".to_string(),
    };
    assert_eq!(format!("{}", link), "Program link failed: missing fragment stage");

    let validate = Error::LinkOrValidateFailed {
        phase: ProgramPhase::Validate,
        log: "sampler mismatch".to_string(),
    };
    assert_eq!(format!("{}", validate), "Program validation failed: sampler mismatch");
}

#[test]
fn test_simple_variants_display() {
    assert_eq!(format!("{}", Error::UnknownUniform("u_color".to_string())), "Unknown uniform: u_color");
    assert_eq!(format!("{}", Error::InvalidResource("buffer".to_string())), "Invalid resource: buffer");
    assert_eq!(format!("{}", Error::BackendError("lost".to_string())), "Backend error: lost");
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::UnknownUniform("u_mvp".to_string());
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let err = Error::CompileFailed { stage: ShaderStage::Vertex, log: "log".to_string() };
    let debug = format!("{:?}", err);
    assert!(debug.contains("CompileFailed"));
    assert!(debug.contains("Vertex"));
}

#[test]
fn test_error_clone() {
    let err1 = Error::GpuCallFailed {
        codes: vec![GlErrorCode::OutOfMemory],
        expression: "gl.buffer_data(target, data)".to_string(),
        file: "a.rs",
        line: 1,
    };
    let err2 = err1.clone();
    assert_eq!(format!("{}", err1), format!("{}", err2));
}

#[test]
fn test_result_propagation() {
    fn inner() -> Result<u32> {
        Err(Error::BackendError("inner".to_string()))
    }
    fn outer() -> Result<u32> {
        let value = inner()?;
        Ok(value + 1)
    }

    match outer() {
        Err(Error::BackendError(msg)) => assert_eq!(msg, "inner"),
        other => panic!("unexpected result: {:?}", other),
    }
}
