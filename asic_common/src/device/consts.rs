//! ASIC device constants.
//!
//! Single source of truth for axis counts, position bounds and the
//! reference cadences of the two device tasks.

use static_assertions::const_assert;

use crate::device::types::Position;

/// Canonical service name (used for logging and as the default instance id).
pub const ASIC_SERVICE_NAME: &str = "asic-hal";

/// Number of axes controlled by the ASIC.
pub const AXIS_COUNT: usize = 4;

/// Lowest position an axis can report or be limited to.
pub const MIN_POSITION: Position = Position::MIN;

/// Highest position an axis can report or be limited to.
pub const MAX_POSITION: Position = Position::MAX;

/// Value written to every axis's env-configuration register during init.
pub const ENV_CONFIG_INIT_VALUE: Position = 0x0000_3838;

/// Default bounded wait on the device gate in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 1000;

/// Default boundary monitor cadence in milliseconds.
pub const DEFAULT_MONITOR_CADENCE_MS: u64 = 1000;

/// Default command servicer cadence in milliseconds.
pub const DEFAULT_SERVICER_CADENCE_MS: u64 = 100;

/// Default maximum number of commands drained per servicer cycle.
pub const DEFAULT_MAX_BATCH: usize = 16;

/// Default task stack size in bytes.
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024;

/// Smallest stack size accepted by configuration validation.
pub const MIN_STACK_SIZE: usize = 16 * 1024;

/// Default boundary monitor priority (lower than the servicer).
pub const DEFAULT_MONITOR_PRIORITY: u8 = 1;

/// Default command servicer priority.
pub const DEFAULT_SERVICER_PRIORITY: u8 = 2;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/asic/asic.toml";

const_assert!(AXIS_COUNT == 4);
const_assert!(MIN_POSITION < MAX_POSITION);
const_assert!(MIN_STACK_SIZE <= DEFAULT_STACK_SIZE);
const_assert!(DEFAULT_MONITOR_PRIORITY < DEFAULT_SERVICER_PRIORITY);
