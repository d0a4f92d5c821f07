//! Diagnostic logging for Nebula GL
//!
//! Every failure path in the core (driver errors, shader compile logs,
//! missing source files) reports through this module:
//! - Pluggable sink via the Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error), INFO and up by default
//! - Colored console output by default, WARN and ERROR on stderr
//! - Call-site file and line on ERROR entries

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom diagnostic sinks
///
/// Install an implementation with `Diagnostics::set_logger`.
///
/// # Example
///
/// ```no_run
/// use nebula_gl::nebula::log::{Logger, LogEntry};
///
/// struct CaptureLogger {
///     lines: std::sync::Mutex<Vec<String>>,
/// }
///
/// impl Logger for CaptureLogger {
///     fn log(&self, entry: &LogEntry) {
///         self.lines.lock().unwrap().push(entry.message.clone());
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Timestamp when the entry was created
    pub timestamp: SystemTime,

    /// Source tag (e.g., "nebula::Shader", "nebula::ErrorGuard")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (detailed entries only)
    pub file: Option<&'static str>,

    /// Source line (detailed entries only)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogSeverity {
    /// Very verbose tracing (every wrapped call)
    Trace = 0,

    /// Development information (resource creation and release)
    Debug = 1,

    /// Important events (program linked, context attached)
    Info = 2,

    /// Recoverable oddities (stale driver errors, validation warnings)
    Warn = 3,

    /// Failures, with file:line
    Error = 4,
}

impl LogSeverity {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => LogSeverity::Trace,
            1 => LogSeverity::Debug,
            2 => LogSeverity::Info,
            3 => LogSeverity::Warn,
            _ => LogSeverity::Error,
        }
    }

    /// Whether the default logger writes this severity to stderr
    pub fn is_diagnostic(&self) -> bool {
        *self >= LogSeverity::Warn
    }
}

/// Default logger implementation using colored console output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Detailed: `[timestamp] [SEVERITY] [source] message (file:line)`
pub struct DefaultLogger;

impl DefaultLogger {
    /// Render an entry as one line (with color codes when the terminal supports them)
    pub fn format_entry(entry: &LogEntry) -> String {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            format!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp,
                severity_str,
                source,
                entry.message,
                file,
                line
            )
        } else {
            format!(
                "[{}] [{}] [{}] {}",
                timestamp,
                severity_str,
                source,
                entry.message
            )
        }
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let line = Self::format_entry(entry);
        if entry.severity.is_diagnostic() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
///
/// ```no_run
/// nebula_gl::nebula_trace!("nebula::Buffer", "bind {}", 3);
/// ```
#[macro_export]
macro_rules! nebula_trace {
    ($source:expr, $($arg:tt)*) => {
        if $crate::nebula::Diagnostics::enabled($crate::nebula::log::LogSeverity::Trace) {
            $crate::nebula::Diagnostics::log(
                $crate::nebula::log::LogSeverity::Trace,
                $source,
                format!($($arg)*)
            )
        }
    };
}

/// Log a DEBUG message
///
/// ```no_run
/// nebula_gl::nebula_debug!("nebula::Buffer", "Created buffer {} ({} bytes)", 1, 32);
/// ```
#[macro_export]
macro_rules! nebula_debug {
    ($source:expr, $($arg:tt)*) => {
        if $crate::nebula::Diagnostics::enabled($crate::nebula::log::LogSeverity::Debug) {
            $crate::nebula::Diagnostics::log(
                $crate::nebula::log::LogSeverity::Debug,
                $source,
                format!($($arg)*)
            )
        }
    };
}

/// Log an INFO message
///
/// ```no_run
/// nebula_gl::nebula_info!("nebula::Shader", "Linked program {}", 3);
/// ```
#[macro_export]
macro_rules! nebula_info {
    ($source:expr, $($arg:tt)*) => {
        if $crate::nebula::Diagnostics::enabled($crate::nebula::log::LogSeverity::Info) {
            $crate::nebula::Diagnostics::log(
                $crate::nebula::log::LogSeverity::Info,
                $source,
                format!($($arg)*)
            )
        }
    };
}

/// Log a WARN message
///
/// ```no_run
/// nebula_gl::nebula_warn!("nebula::Shader", "Program {} failed validation", 3);
/// ```
#[macro_export]
macro_rules! nebula_warn {
    ($source:expr, $($arg:tt)*) => {
        if $crate::nebula::Diagnostics::enabled($crate::nebula::log::LogSeverity::Warn) {
            $crate::nebula::Diagnostics::log(
                $crate::nebula::log::LogSeverity::Warn,
                $source,
                format!($($arg)*)
            )
        }
    };
}

/// Log an ERROR message with file:line information
///
/// ```no_run
/// nebula_gl::nebula_error!("nebula::Shader", "Failed to compile: {}", "log");
/// ```
#[macro_export]
macro_rules! nebula_error {
    ($source:expr, $($arg:tt)*) => {
        if $crate::nebula::Diagnostics::enabled($crate::nebula::log::LogSeverity::Error) {
            $crate::nebula::Diagnostics::log_detailed(
                $crate::nebula::log::LogSeverity::Error,
                $source,
                format!($($arg)*),
                file!(),
                line!()
            )
        }
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
