//! Simulated ASIC register file.
//!
//! `SimulatedAsic` implements `RegisterTransport` over an in-memory register
//! file so the coordinator runs without hardware. It optionally journals
//! every operation, injects communication faults per axis and adds a fixed
//! per-operation latency to emulate a slow bus.

use asic_common::device::config::SimulationConfig;
use asic_common::device::consts::AXIS_COUNT;
use asic_common::device::transport::{RegisterTransport, TransportError};
use asic_common::device::types::{AxisId, Position, Register};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// One operation seen by the simulated ASIC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOp {
    /// Register read
    Read {
        /// Axis addressed
        axis: AxisId,
        /// Register addressed
        register: Register,
    },
    /// Register write
    Write {
        /// Axis addressed
        axis: AxisId,
        /// Register addressed
        register: Register,
        /// Value written
        value: Position,
    },
}

/// Register values of one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AxisRegisters {
    position: Position,
    env_config: Position,
    lower_limit: Position,
    upper_limit: Position,
}

impl AxisRegisters {
    fn get(&self, register: Register) -> Position {
        match register {
            Register::CurrentPosition => self.position,
            Register::EnvConfig => self.env_config,
            Register::LowerLimit => self.lower_limit,
            Register::UpperLimit => self.upper_limit,
        }
    }

    fn slot_mut(&mut self, register: Register) -> &mut Position {
        match register {
            Register::CurrentPosition => &mut self.position,
            Register::EnvConfig => &mut self.env_config,
            Register::LowerLimit => &mut self.lower_limit,
            Register::UpperLimit => &mut self.upper_limit,
        }
    }
}

/// In-memory ASIC with four axes.
#[derive(Debug, Clone)]
pub struct SimulatedAsic {
    axes: [AxisRegisters; AXIS_COUNT],
    journal: Option<Vec<RegisterOp>>,
    faulty_axis: Option<AxisId>,
    op_latency: Duration,
}

impl SimulatedAsic {
    /// Create a simulated ASIC reporting the given positions, axis 1 first.
    pub fn new(positions: [Position; AXIS_COUNT]) -> Self {
        let mut axes = [AxisRegisters::default(); AXIS_COUNT];
        for (regs, position) in axes.iter_mut().zip(positions) {
            regs.position = position;
        }
        Self {
            axes,
            journal: None,
            faulty_axis: None,
            op_latency: Duration::ZERO,
        }
    }

    /// Create a simulated ASIC from configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        debug!("Simulated ASIC positions: {:?}", config.initial_positions);
        Self::new(config.initial_positions)
    }

    /// Record every operation in a journal.
    pub fn with_journal(mut self) -> Self {
        self.journal = Some(Vec::new());
        self
    }

    /// Sleep for `latency` on every operation.
    pub fn with_op_latency(mut self, latency: Duration) -> Self {
        self.op_latency = latency;
        self
    }

    /// Make every operation on `axis` fail with a communication error,
    /// or clear the fault with `None`.
    pub fn set_faulty_axis(&mut self, axis: Option<AxisId>) {
        self.faulty_axis = axis;
    }

    /// Move an axis. Stands in for physical motion.
    pub fn set_position(&mut self, axis: AxisId, position: Position) {
        self.axes[axis.slot()].position = position;
    }

    /// Inspect a register without journaling the access.
    pub fn peek(&self, axis: AxisId, register: Register) -> Position {
        self.axes[axis.slot()].get(register)
    }

    /// Journaled operations, oldest first. Empty when journaling is off.
    pub fn journal(&self) -> &[RegisterOp] {
        self.journal.as_deref().unwrap_or(&[])
    }

    /// Journaled writes as `(axis, register, value)`.
    pub fn writes(&self) -> Vec<(AxisId, Register, Position)> {
        self.journal()
            .iter()
            .filter_map(|op| match *op {
                RegisterOp::Write {
                    axis,
                    register,
                    value,
                } => Some((axis, register, value)),
                RegisterOp::Read { .. } => None,
            })
            .collect()
    }

    /// Discard journaled operations.
    pub fn clear_journal(&mut self) {
        if let Some(journal) = self.journal.as_mut() {
            journal.clear();
        }
    }

    fn access(
        &mut self,
        op: RegisterOp,
        axis: AxisId,
        register: Register,
    ) -> Result<(), TransportError> {
        if !self.op_latency.is_zero() {
            thread::sleep(self.op_latency);
        }
        if self.faulty_axis == Some(axis) {
            return Err(TransportError::Communication {
                axis,
                register,
                details: "simulated bus fault".to_string(),
            });
        }
        if let Some(journal) = self.journal.as_mut() {
            journal.push(op);
        }
        Ok(())
    }
}

impl RegisterTransport for SimulatedAsic {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn read(&mut self, axis: AxisId, register: Register) -> Result<Position, TransportError> {
        self.access(RegisterOp::Read { axis, register }, axis, register)?;
        let value = self.peek(axis, register);
        trace!("sim read {axis}/{register} = {value}");
        Ok(value)
    }

    fn write(
        &mut self,
        axis: AxisId,
        register: Register,
        value: Position,
    ) -> Result<(), TransportError> {
        if !register.is_writable() {
            return Err(TransportError::ReadOnlyRegister { axis, register });
        }
        self.access(
            RegisterOp::Write {
                axis,
                register,
                value,
            },
            axis,
            register,
        )?;
        *self.axes[axis.slot()].slot_mut(register) = value;
        trace!("sim write {axis}/{register} = {value}");
        Ok(())
    }
}
