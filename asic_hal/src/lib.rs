//! # ASIC HAL Library
//!
//! Coordinates two periodic tasks that share one four-axis ASIC.
//!
//! Every register access goes through a single [`gate::DeviceGate`] with a
//! bounded wait. The boundary monitor keeps the axes inside collision-free
//! windows; the command servicer executes register commands from outside.
//!
//! # Module Structure
//!
//! - [`gate`] - Device access gate (bounded-wait mutex over the transport)
//! - [`boundary`] - Midpoint window computation
//! - [`monitor`] - Boundary monitor task
//! - [`servicer`] - Command servicer task and command sources
//! - [`task`] - Periodic task trait and loop
//! - [`cadence`] - Cadence timing and shutdown signal
//! - [`stats`] - Per-task cycle statistics
//! - [`runtime`] - Thread wiring and lifecycle
//! - [`transport_registry`] - Transport factory registration
//! - [`transports`] - Register transport implementations
//! - [`error`] - Error types
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         asic_hal                                 │
//! │  ┌─────────────────┐                    ┌─────────────────────┐  │
//! │  │ BoundaryMonitor │                    │  CommandServicer    │◄─── CommandSource
//! │  │   (1000 ms)     │                    │    (100 ms)         │  │
//! │  └────────┬────────┘                    └──────────┬──────────┘  │
//! │           │        acquire(lock_timeout)           │             │
//! │           └──────────────►┌──────────┐◄────────────┘             │
//! │                           │DeviceGate│                           │
//! │                           └────┬─────┘                           │
//! │                                ▼                                 │
//! │                      ┌───────────────────┐                       │
//! │                      │ RegisterTransport │ (trait object)        │
//! │                      └───────────────────┘                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod boundary;
pub mod cadence;
pub mod error;
pub mod gate;
pub mod monitor;
pub mod runtime;
pub mod servicer;
pub mod stats;
pub mod task;
pub mod transport_registry;
pub mod transports;

// Re-export key types for convenience
pub use crate::error::{CoreError, CycleError, GateError, InitFailure};
pub use crate::gate::{DeviceGate, GateGuard};
pub use crate::monitor::BoundaryMonitor;
pub use crate::runtime::{AsicRuntime, RuntimeHandle, RuntimeReport};
pub use crate::servicer::{ChannelCommandSource, Command, CommandClient, CommandServicer};
pub use crate::transport_registry::TransportRegistry;
