//! Error types for gate access, task cycles and startup.
//!
//! Cycle-scoped errors (`CycleError`, `InitFailure`) are never fatal: the
//! task logs them and retries on its next tick. `CoreError` is reserved for
//! startup, before any task runs.

use asic_common::config::ConfigError;
use asic_common::device::transport::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain the device gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    /// Gate not acquired within the bounded wait
    #[error("device gate not acquired within {timeout:?}")]
    LockTimeout {
        /// The wait that elapsed
        timeout: Duration,
    },
}

/// Error ending a single task cycle early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    /// Gate not acquired; no register was touched
    #[error("device gate not acquired within {timeout:?}")]
    LockTimeout {
        /// The wait that elapsed
        timeout: Duration,
    },

    /// The transport rejected or failed an operation
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}

impl From<GateError> for CycleError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::LockTimeout { timeout } => CycleError::LockTimeout { timeout },
        }
    }
}

impl CycleError {
    /// True for gate timeouts.
    pub fn is_lock_timeout(&self) -> bool {
        matches!(self, CycleError::LockTimeout { .. })
    }
}

/// Env-configuration could not be written during task init.
///
/// Not retried. Axes left unconfigured surface later as nonsensical
/// position readings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("env-configuration init failed: {cause}")]
pub struct InitFailure {
    /// What stopped the init sequence
    pub cause: CycleError,
}

impl From<CycleError> for InitFailure {
    fn from(cause: CycleError) -> Self {
        Self { cause }
    }
}

impl From<GateError> for InitFailure {
    fn from(err: GateError) -> Self {
        Self { cause: err.into() }
    }
}

impl From<TransportError> for InitFailure {
    fn from(err: TransportError) -> Self {
        Self { cause: err.into() }
    }
}

/// Startup errors. These stop the binary before the tasks are spawned.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No transport registered under the requested name
    #[error("Transport not found: {0}")]
    TransportNotFound(String),

    /// A task thread could not be spawned
    #[error("Failed to spawn task '{task}': {reason}")]
    SpawnFailed {
        /// Name of the task
        task: &'static str,
        /// OS error description
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use asic_common::device::types::{AxisId, Register};

    #[test]
    fn test_gate_error_converts_to_cycle_timeout() {
        let err: CycleError = GateError::LockTimeout {
            timeout: Duration::from_millis(1000),
        }
        .into();
        assert!(err.is_lock_timeout());
        assert!(err.to_string().contains("1s"));
    }

    #[test]
    fn test_init_failure_display_includes_cause() {
        let failure = InitFailure::from(TransportError::Communication {
            axis: AxisId::ALL[2],
            register: Register::EnvConfig,
            details: "no ack".to_string(),
        });
        let msg = failure.to_string();
        assert!(msg.contains("env-configuration"));
        assert!(msg.contains("axis3"));
        assert!(!failure.cause.is_lock_timeout());
    }

    #[test]
    fn test_core_error_display() {
        let err = CoreError::TransportNotFound("spi".to_string());
        assert!(err.to_string().contains("spi"));
    }
}
