//! Tests to verify that all public types are Send + Sync as required.

use stimulus_core::cli::{ExitCode, OutputTarget};
use stimulus_core::*;

const fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_domain_types_are_send_sync() {
    assert_send_sync::<BackendName>();
    assert_send_sync::<BlockName>();
}

#[test]
fn test_cli_types_are_send_sync() {
    assert_send_sync::<ExitCode>();
    assert_send_sync::<OutputTarget>();
}

#[test]
fn test_config_types_are_send_sync() {
    assert_send_sync::<GeneratorConfig>();
    assert_send_sync::<GeneratorConfigBuilder>();
}

#[test]
fn test_error_is_send_sync() {
    // Errors cross the job boundary into the CLI's anyhow chain
    assert_send_sync::<Error>();
}
