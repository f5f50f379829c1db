//! ASIC coordinator configuration types.
//!
//! This module contains the configuration loaded from `asic.toml`:
//! - `AsicConfig` - Top-level configuration
//! - `GateConfig` - Device gate bounded wait
//! - `MonitorConfig` / `ServicerConfig` - Per-task cadence and thread settings
//! - `SimulationConfig` - Simulated ASIC initial state
//!
//! Every section is optional; omitted fields take the reference defaults.

use crate::config::{ConfigError, SharedConfig};
use crate::device::consts::{
    AXIS_COUNT, DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAX_BATCH, DEFAULT_MONITOR_CADENCE_MS,
    DEFAULT_MONITOR_PRIORITY, DEFAULT_SERVICER_CADENCE_MS, DEFAULT_SERVICER_PRIORITY,
    DEFAULT_STACK_SIZE, ENV_CONFIG_INIT_VALUE, MIN_STACK_SIZE,
};
use crate::device::types::Position;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

fn default_monitor_cadence_ms() -> u64 {
    DEFAULT_MONITOR_CADENCE_MS
}

fn default_servicer_cadence_ms() -> u64 {
    DEFAULT_SERVICER_CADENCE_MS
}

fn default_env_config_value() -> Position {
    ENV_CONFIG_INIT_VALUE
}

fn default_stack_size() -> usize {
    DEFAULT_STACK_SIZE
}

fn default_monitor_priority() -> u8 {
    DEFAULT_MONITOR_PRIORITY
}

fn default_servicer_priority() -> u8 {
    DEFAULT_SERVICER_PRIORITY
}

fn default_max_batch() -> usize {
    DEFAULT_MAX_BATCH
}

fn default_initial_positions() -> [Position; AXIS_COUNT] {
    [0, 100, 300, 350]
}

/// Main configuration loaded from `asic.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AsicConfig {
    /// Logging and instance identity.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Device gate settings.
    #[serde(default)]
    pub gate: GateConfig,

    /// Boundary monitor task settings.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Command servicer task settings.
    #[serde(default)]
    pub servicer: ServicerConfig,

    /// Simulated transport settings.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl AsicConfig {
    /// Validate the whole configuration.
    ///
    /// # Validation Rules
    /// 1. `shared.service_name` not empty
    /// 2. `gate.lock_timeout_ms` > 0
    /// 3. Task cadences > 0
    /// 4. Task stack sizes >= `MIN_STACK_SIZE`
    /// 5. `servicer.max_batch` >= 1
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.gate.lock_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "gate.lock_timeout_ms must be greater than 0".to_string(),
            ));
        }

        validate_task("monitor", self.monitor.cadence_ms, self.monitor.stack_size)?;
        validate_task(
            "servicer",
            self.servicer.cadence_ms,
            self.servicer.stack_size,
        )?;

        if self.servicer.max_batch == 0 {
            return Err(ConfigError::ValidationError(
                "servicer.max_batch must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_task(task: &str, cadence_ms: u64, stack_size: usize) -> Result<(), ConfigError> {
    if cadence_ms == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{task}.cadence_ms must be greater than 0"
        )));
    }
    if stack_size < MIN_STACK_SIZE {
        return Err(ConfigError::ValidationError(format!(
            "{task}.stack_size {stack_size} is below the minimum of {MIN_STACK_SIZE} bytes"
        )));
    }
    Ok(())
}

/// Device gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Bounded wait for acquiring the gate, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl GateConfig {
    /// Bounded wait as a `Duration`.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

/// Boundary monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Interval between monitor cycles, in milliseconds.
    #[serde(default = "default_monitor_cadence_ms")]
    pub cadence_ms: u64,

    /// Value written to every env-configuration register during init.
    #[serde(default = "default_env_config_value")]
    pub env_config_value: Position,

    /// Scheduling priority (higher runs first). Applied only in RT builds.
    #[serde(default = "default_monitor_priority")]
    pub priority: u8,

    /// Thread stack size in bytes.
    #[serde(default = "default_stack_size")]
    pub stack_size: usize,
}

impl MonitorConfig {
    /// Cadence as a `Duration`.
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            cadence_ms: DEFAULT_MONITOR_CADENCE_MS,
            env_config_value: ENV_CONFIG_INIT_VALUE,
            priority: DEFAULT_MONITOR_PRIORITY,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

/// Command servicer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServicerConfig {
    /// Interval between servicer cycles, in milliseconds.
    #[serde(default = "default_servicer_cadence_ms")]
    pub cadence_ms: u64,

    /// Maximum number of commands executed per cycle.
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,

    /// Scheduling priority (higher runs first). Applied only in RT builds.
    #[serde(default = "default_servicer_priority")]
    pub priority: u8,

    /// Thread stack size in bytes.
    #[serde(default = "default_stack_size")]
    pub stack_size: usize,
}

impl ServicerConfig {
    /// Cadence as a `Duration`.
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }
}

impl Default for ServicerConfig {
    fn default() -> Self {
        Self {
            cadence_ms: DEFAULT_SERVICER_CADENCE_MS,
            max_batch: DEFAULT_MAX_BATCH,
            priority: DEFAULT_SERVICER_PRIORITY,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

/// Simulated ASIC configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Position reported by each axis at startup, axis 1 first.
    #[serde(default = "default_initial_positions")]
    pub initial_positions: [Position; AXIS_COUNT],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_positions: default_initial_positions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_cadence() {
        let config = AsicConfig::default();
        assert_eq!(config.gate.lock_timeout(), Duration::from_millis(1000));
        assert_eq!(config.monitor.cadence(), Duration::from_millis(1000));
        assert_eq!(config.servicer.cadence(), Duration::from_millis(100));
        assert_eq!(config.monitor.env_config_value, 0x3838);
        assert!(config.monitor.priority < config.servicer.priority);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_lock_timeout_rejected() {
        let mut config = AsicConfig::default();
        config.gate.lock_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(msg)) if msg.contains("lock_timeout_ms")
        ));
    }

    #[test]
    fn test_zero_cadence_rejected() {
        let mut config = AsicConfig::default();
        config.servicer.cadence_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(msg)) if msg.contains("servicer.cadence_ms")
        ));
    }

    #[test]
    fn test_small_stack_rejected() {
        let mut config = AsicConfig::default();
        config.monitor.stack_size = 1024;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(msg)) if msg.contains("monitor.stack_size")
        ));
    }

    #[test]
    fn test_zero_batch_rejected() {
        let mut config = AsicConfig::default();
        config.servicer.max_batch = 0;
        assert!(config.validate().is_err());
    }
}
