//! Register transport trait and error types.
//!
//! This module defines:
//! - `RegisterTransport` trait - Interface to the concrete register bus
//! - `TransportError` enum - Device-level failures
//! - `TransportFactory` type alias - Factory function type

use crate::device::config::AsicConfig;
use crate::device::types::{AxisId, Position, Register};
use thiserror::Error;

/// Device-level errors reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Bus or device communication failed
    #[error("communication error on {axis}/{register}: {details}")]
    Communication {
        /// Axis addressed by the failed operation
        axis: AxisId,
        /// Register addressed by the failed operation
        register: Register,
        /// Driver-specific description
        details: String,
    },

    /// Attempted write to a read-only register
    #[error("register {register} on {axis} is read-only")]
    ReadOnlyRegister {
        /// Axis addressed by the rejected write
        axis: AxisId,
        /// Register addressed by the rejected write
        register: Register,
    },

    /// Transport does not support this register
    #[error("register {register} is not supported by the transport")]
    Unsupported {
        /// Register that was requested
        register: Register,
    },
}

/// Factory function type for creating transport instances.
pub type TransportFactory = fn(&AsicConfig) -> Box<dyn RegisterTransport>;

/// Opaque capability to read and write ASIC registers.
///
/// Implementations must not lock. Serialization of all access is the
/// responsibility of the device gate, which hands out `&mut` access to one
/// holder at a time.
pub trait RegisterTransport: Send {
    /// Returns the transport's identifier (e.g., "simulation", "spi").
    fn name(&self) -> &'static str;

    /// Read a register value.
    fn read(&mut self, axis: AxisId, register: Register) -> Result<Position, TransportError>;

    /// Write a register value.
    fn write(
        &mut self,
        axis: AxisId,
        register: Register,
        value: Position,
    ) -> Result<(), TransportError>;
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn read(&mut self, axis: AxisId, register: Register) -> Result<Position, TransportError> {
        (**self).read(axis, register)
    }

    fn write(
        &mut self,
        axis: AxisId,
        register: Register,
        value: Position,
    ) -> Result<(), TransportError> {
        (**self).write(axis, register, value)
    }
}
