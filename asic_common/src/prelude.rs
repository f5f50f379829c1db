//! Prelude module for common re-exports.
//!
//! Consumers can `use asic_common::prelude::*;` to get the most important
//! types without listing individual paths.

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::device::config::{
    AsicConfig, GateConfig, MonitorConfig, ServicerConfig, SimulationConfig,
};

// ─── Device ─────────────────────────────────────────────────────────
pub use crate::device::consts::{AXIS_COUNT, MAX_POSITION, MIN_POSITION};
pub use crate::device::transport::{RegisterTransport, TransportError, TransportFactory};
pub use crate::device::types::{AxisId, AxisWindows, InvalidAxis, Position, Register, Window};
