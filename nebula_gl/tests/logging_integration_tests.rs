//! Integration tests for diagnostic logging
//!
//! Verifies that driver errors, compile failures and missing sources reach the
//! installed logger with the right severity, source tag and call site.
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use nebula_gl::nebula::buffer::VertexBuffer;
use nebula_gl::nebula::device::{BufferTarget, GpuContext, MockDevice};
use nebula_gl::nebula::log::{LogEntry, LogSeverity, Logger};
use nebula_gl::nebula::shader::{ShaderProgramBuilder, ShaderProgramSource};
use nebula_gl::nebula::{Config, Diagnostics, Error};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn errors_from(entries: &[LogEntry], source: &str) -> Vec<LogEntry> {
    entries.iter()
        .filter(|entry| entry.severity == LogSeverity::Error && entry.source == source)
        .cloned()
        .collect()
}

fn checked_context() -> (Rc<MockDevice>, Rc<GpuContext>) {
    let device = Rc::new(MockDevice::new());
    let context = GpuContext::new(device.clone(), Config::default().with_gpu_error_checks(true));
    (device, context)
}

// ============================================================================
// FACADE
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    Diagnostics::set_logger(test_logger);

    Diagnostics::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    Diagnostics::log_detailed(LogSeverity::Error, "test::module", "Test error message".to_string(), "test_file.rs", 42);

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].severity, LogSeverity::Info);
        assert_eq!(captured[0].file, None);
        assert_eq!(captured[1].severity, LogSeverity::Error);
        assert_eq!(captured[1].file, Some("test_file.rs"));
        assert_eq!(captured[1].line, Some(42));
    }

    Diagnostics::reset_logger();
    Diagnostics::log(LogSeverity::Info, "test::module", "Not captured".to_string());
    assert_eq!(entries.lock().unwrap().len(), 2);
}

#[test]
#[serial]
fn test_integration_min_severity_filter() {
    let (test_logger, entries) = TestLogger::new();
    Diagnostics::set_logger(test_logger);
    Diagnostics::set_min_severity(LogSeverity::Warn);
    assert_eq!(Diagnostics::min_severity(), LogSeverity::Warn);

    Diagnostics::log(LogSeverity::Trace, "test", "Trace message".to_string());
    Diagnostics::log(LogSeverity::Info, "test", "Info message".to_string());
    Diagnostics::log(LogSeverity::Warn, "test", "Warn message".to_string());
    Diagnostics::log(LogSeverity::Error, "test", "Error message".to_string());

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].severity, LogSeverity::Warn);
        assert_eq!(captured[1].severity, LogSeverity::Error);
    }

    Diagnostics::set_min_severity(LogSeverity::Info);
    Diagnostics::reset_logger();
}

#[test]
#[serial]
fn test_integration_wrapped_calls_quiet_by_default() {
    assert_eq!(Diagnostics::min_severity(), LogSeverity::Info);
    assert!(!Diagnostics::enabled(LogSeverity::Trace));
    assert!(!Diagnostics::enabled(LogSeverity::Debug));
    assert!(Diagnostics::enabled(LogSeverity::Info));
    assert!(Diagnostics::enabled(LogSeverity::Error));

    let (test_logger, entries) = TestLogger::new();
    Diagnostics::set_logger(test_logger);

    let (_device, context) = checked_context();
    let vertices = VertexBuffer::new(context, &[0u8; 16]).unwrap();
    for _ in 0..10 {
        vertices.bind().unwrap();
    }

    {
        let captured = entries.lock().unwrap();
        assert!(captured.iter().all(|entry| entry.severity >= LogSeverity::Info));
    }

    // Opting in brings the per-call trace back
    Diagnostics::set_min_severity(LogSeverity::Trace);
    vertices.bind().unwrap();
    {
        let captured = entries.lock().unwrap();
        let traces = captured.iter()
            .filter(|entry| entry.severity == LogSeverity::Trace && entry.source == "nebula::ErrorGuard")
            .count();
        assert_eq!(traces, 1);
    }

    Diagnostics::set_min_severity(LogSeverity::Info);
    Diagnostics::reset_logger();
}

// ============================================================================
// FAILURE PATHS
// ============================================================================

#[test]
#[serial]
fn test_integration_gpu_error_logged_with_call_site() {
    let (test_logger, entries) = TestLogger::new();
    Diagnostics::set_logger(test_logger);

    let (device, context) = checked_context();
    let result = nebula_gl::gl_call!(context, |gl| gl.bind_buffer(BufferTarget::Vertex, 4242));
    let expected_line = line!() - 1;

    let error = result.unwrap_err();
    assert!(matches!(error, Error::GpuCallFailed { .. }));
    assert_eq!(device.pending_errors(), 0);

    let captured = entries.lock().unwrap().clone();
    let errors = errors_from(&captured, "nebula::ErrorGuard");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("[OpenGL Error]"));
    assert!(errors[0].message.contains("GL_INVALID_OPERATION"));
    assert!(errors[0].message.contains("bind_buffer"));
    assert!(errors[0].file.unwrap().ends_with("logging_integration_tests.rs"));
    assert_eq!(errors[0].line, Some(expected_line));

    Diagnostics::reset_logger();
}

#[test]
#[serial]
fn test_integration_stale_errors_logged_as_warning() {
    let (test_logger, entries) = TestLogger::new();
    Diagnostics::set_logger(test_logger);

    let (device, context) = checked_context();
    device.push_error(nebula_gl::nebula::device::GlErrorCode::InvalidEnum);
    nebula_gl::gl_call!(context, |gl| gl.bind_buffer(BufferTarget::Vertex, 0)).unwrap();

    let captured = entries.lock().unwrap().clone();
    let warnings: Vec<_> = captured.iter()
        .filter(|entry| entry.severity == LogSeverity::Warn && entry.source == "nebula::ErrorGuard")
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("GL_INVALID_ENUM"));

    Diagnostics::reset_logger();
}

#[test]
#[serial]
fn test_integration_compile_failure_logs_driver_log() {
    let (test_logger, entries) = TestLogger::new();
    Diagnostics::set_logger(test_logger);

    let (_device, context) = checked_context();
    let source = ShaderProgramSource {
        vertex: "void main() {\n".to_string(),
        fragment: "void main() { }\n".to_string(),
    };
    let result = ShaderProgramBuilder::new(context).build(&source);
    assert!(matches!(result, Err(Error::CompileFailed { .. })));

    let captured = entries.lock().unwrap().clone();
    let errors = errors_from(&captured, "nebula::Shader");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("vertex"));
    assert!(errors[0].message.contains("unbalanced braces"));
    assert!(errors[0].file.is_some());

    Diagnostics::reset_logger();
}

#[test]
#[serial]
fn test_integration_missing_source_logged() {
    let (test_logger, entries) = TestLogger::new();
    Diagnostics::set_logger(test_logger);

    let dir = tempfile::tempdir().unwrap();
    let result = ShaderProgramSource::from_file(dir.path().join("nope.shader"));
    assert!(matches!(result, Err(Error::SourceNotFound { .. })));

    let captured = entries.lock().unwrap().clone();
    let errors = errors_from(&captured, "nebula::ShaderSource");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("nope.shader"));

    Diagnostics::reset_logger();
}
