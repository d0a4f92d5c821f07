use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.check_gpu_errors);
    assert_eq!(config.compile_failure_policy, CompileFailurePolicy::ShortCircuit);
    assert_eq!(config.validation_policy, ValidationPolicy::LogOnly);
    assert_eq!(config.marker_token, "#shader");
}

#[test]
fn test_config_builders() {
    let config = Config::default()
        .with_gpu_error_checks(false)
        .with_compile_failure_policy(CompileFailurePolicy::Lenient)
        .with_validation_policy(ValidationPolicy::Fatal)
        .with_marker_token("//@stage");

    assert!(!config.check_gpu_errors);
    assert_eq!(config.compile_failure_policy, CompileFailurePolicy::Lenient);
    assert_eq!(config.validation_policy, ValidationPolicy::Fatal);
    assert_eq!(config.marker_token, "//@stage");
}

#[test]
fn test_config_clone_is_independent() {
    let original = Config::default();
    let modified = original.clone().with_marker_token("@@");
    assert_eq!(original.marker_token, "#shader");
    assert_eq!(modified.marker_token, "@@");
}
