/// Nebula GL configuration

use crate::shader::DEFAULT_MARKER_TOKEN;

/// What the program builder does when a shader stage fails to compile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileFailurePolicy {
    /// Stop at the first failing stage and return its compile error
    ShortCircuit,
    /// Compile every stage and attempt a link with whatever compiled,
    /// then report the first compile error
    Lenient,
}

/// What the program builder does when glValidateProgram reports failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Log a warning and keep the program
    LogOnly,
    /// Delete the program and return an error
    Fatal,
}

/// Configuration shared by every resource created from a `GpuContext`
#[derive(Debug, Clone)]
pub struct Config {
    /// Drain and check the driver error queue around every wrapped call.
    /// On by default in every build profile
    pub check_gpu_errors: bool,
    /// Behaviour on shader compile failure
    pub compile_failure_policy: CompileFailurePolicy,
    /// Behaviour on program validation failure
    pub validation_policy: ValidationPolicy,
    /// Token that marks a stage switch line in combined shader source files
    pub marker_token: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            check_gpu_errors: true,
            compile_failure_policy: CompileFailurePolicy::ShortCircuit,
            validation_policy: ValidationPolicy::LogOnly,
            marker_token: DEFAULT_MARKER_TOKEN.to_string(),
        }
    }
}

impl Config {
    pub fn with_gpu_error_checks(mut self, enabled: bool) -> Self {
        self.check_gpu_errors = enabled;
        self
    }

    pub fn with_compile_failure_policy(mut self, policy: CompileFailurePolicy) -> Self {
        self.compile_failure_policy = policy;
        self
    }

    pub fn with_validation_policy(mut self, policy: ValidationPolicy) -> Self {
        self.validation_policy = policy;
        self
    }

    pub fn with_marker_token(mut self, token: impl Into<String>) -> Self {
        self.marker_token = token.into();
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
