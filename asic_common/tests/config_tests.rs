//! Config loading tests.
//!
//! Tests for `AsicConfig` loaded through `ConfigLoader`: full file parsing,
//! partial sections falling back to defaults, unknown field rejection and
//! validation of numeric bounds.

use asic_common::config::{ConfigError, ConfigLoader, LogLevel};
use asic_common::device::config::AsicConfig;
use std::fs;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[shared]
log_level = "debug"
service_name = "asic-bench"

[gate]
lock_timeout_ms = 250

[monitor]
cadence_ms = 500
env_config_value = 0x3838
priority = 3
stack_size = 32768

[servicer]
cadence_ms = 20
max_batch = 4
priority = 5
stack_size = 32768

[simulation]
initial_positions = [-1000, 0, 1000, 2000]
"#;

// ─── Tests ──────────────────────────────────────────────────────────

#[test]
fn load_full_config_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("asic.toml");
    fs::write(&path, FULL_CONFIG).unwrap();

    let config = AsicConfig::load(&path).expect("should load");
    config.validate().expect("should validate");

    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.shared.service_name, "asic-bench");
    assert_eq!(config.gate.lock_timeout_ms, 250);
    assert_eq!(config.monitor.cadence_ms, 500);
    assert_eq!(config.monitor.env_config_value, 0x3838);
    assert_eq!(config.monitor.priority, 3);
    assert_eq!(config.servicer.max_batch, 4);
    assert_eq!(config.servicer.priority, 5);
    assert_eq!(
        config.simulation.initial_positions,
        [-1000, 0, 1000, 2000]
    );
}

#[test]
fn empty_file_yields_defaults() {
    let config = AsicConfig::from_toml("").expect("empty config is valid");
    config.validate().expect("defaults validate");
    assert_eq!(config.gate.lock_timeout_ms, 1000);
    assert_eq!(config.monitor.cadence_ms, 1000);
    assert_eq!(config.servicer.cadence_ms, 100);
    assert_eq!(config.simulation.initial_positions, [0, 100, 300, 350]);
}

#[test]
fn partial_section_keeps_other_defaults() {
    let config = AsicConfig::from_toml("[monitor]\ncadence_ms = 10\n").unwrap();
    assert_eq!(config.monitor.cadence_ms, 10);
    assert_eq!(config.monitor.env_config_value, 0x3838);
    assert_eq!(config.servicer.cadence_ms, 100);
}

#[test]
fn unknown_field_rejected() {
    let result = AsicConfig::from_toml("[gate]\nlock_timeout = 5\n");
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn wrong_position_count_rejected() {
    let result = AsicConfig::from_toml("[simulation]\ninitial_positions = [1, 2, 3]\n");
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn validation_rejects_zero_timeout_from_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("asic.toml");
    fs::write(&path, "[gate]\nlock_timeout_ms = 0\n").unwrap();

    let config = AsicConfig::load(&path).expect("parses");
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn missing_file_reported() {
    let tmp = TempDir::new().unwrap();
    let result = AsicConfig::load(&tmp.path().join("missing.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound)));
}
