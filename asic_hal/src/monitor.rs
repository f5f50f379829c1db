//! Boundary monitor task.
//!
//! Keeps adjacent axes from colliding by rewriting every axis's travel
//! window from the latest positions.
//!
//! # Phases
//!
//! - **Init** (once): write the env-configuration register of all four
//!   axes. Best effort; a failure is reported and never retried.
//! - **Periodic**: read all positions, compute windows with
//!   [`compute_windows`], write lower then upper limit for axes 1..=4.
//!
//! Every register access happens with the device gate held. All reads
//! complete before the first write, so a failed read leaves the limit
//! registers untouched.

use asic_common::device::config::AsicConfig;
use asic_common::device::consts::AXIS_COUNT;
use asic_common::device::transport::{RegisterTransport, TransportError};
use asic_common::device::types::{AxisId, AxisWindows, Position, Register};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::boundary::{compute_windows, inverted_pairs};
use crate::error::{CycleError, InitFailure};
use crate::gate::DeviceGate;
use crate::task::DeviceTask;

/// Periodic task that recomputes axis travel windows.
pub struct BoundaryMonitor<T> {
    gate: DeviceGate<T>,
    lock_timeout: Duration,
    env_config_value: Position,
    last_windows: Option<AxisWindows>,
}

impl<T: RegisterTransport> BoundaryMonitor<T> {
    /// Create the monitor with explicit settings.
    pub fn new(gate: DeviceGate<T>, lock_timeout: Duration, env_config_value: Position) -> Self {
        Self {
            gate,
            lock_timeout,
            env_config_value,
            last_windows: None,
        }
    }

    /// Create the monitor from the coordinator configuration.
    pub fn from_config(gate: DeviceGate<T>, config: &AsicConfig) -> Self {
        Self::new(
            gate,
            config.gate.lock_timeout(),
            config.monitor.env_config_value,
        )
    }

    /// Write the env-configuration register of every axis.
    ///
    /// # Errors
    /// Returns `InitFailure` if the gate times out or a write fails. Axes
    /// written before a failed write keep their new value.
    pub fn initialize_axes(&mut self) -> Result<(), InitFailure> {
        let mut device = self.gate.acquire(self.lock_timeout)?;
        for axis in AxisId::ALL {
            device.write(axis, Register::EnvConfig, self.env_config_value)?;
        }
        device.release();

        info!(
            "Env-configuration 0x{:08x} written to {} axes",
            self.env_config_value, AXIS_COUNT
        );
        Ok(())
    }

    /// Run one boundary cycle: read positions, compute and write windows.
    ///
    /// # Errors
    /// - `CycleError::LockTimeout` if the gate was not acquired. Nothing was
    ///   read or written.
    /// - `CycleError::Transport` if a read or write failed. A failed read
    ///   means no limit was written; a failed write stops the remaining
    ///   writes of the cycle.
    pub fn run_cycle(&mut self) -> Result<AxisWindows, CycleError> {
        let mut device = self.gate.acquire(self.lock_timeout)?;
        let positions = read_positions(&mut *device)?;
        let windows = compute_windows(positions);
        write_windows(&mut *device, &windows)?;
        device.release();

        for (lower_axis, upper_axis) in inverted_pairs(&positions) {
            warn!(
                "{lower_axis} at {} is ahead of {upper_axis} at {}; windows are inverted",
                positions[lower_axis.slot()],
                positions[upper_axis.slot()]
            );
        }
        debug!("Positions {positions:?} -> windows {windows:?}");

        self.last_windows = Some(windows);
        Ok(windows)
    }

    /// Windows written by the most recent successful cycle.
    pub fn last_windows(&self) -> Option<AxisWindows> {
        self.last_windows
    }
}

impl<T: RegisterTransport> DeviceTask for BoundaryMonitor<T> {
    fn name(&self) -> &'static str {
        "monitor"
    }

    fn init(&mut self) -> Result<(), InitFailure> {
        self.initialize_axes()
    }

    fn cycle(&mut self) -> Result<(), CycleError> {
        self.run_cycle().map(|_| ())
    }
}

/// Read the current position of every axis, axis 1 first.
fn read_positions<T: RegisterTransport + ?Sized>(
    device: &mut T,
) -> Result<[Position; AXIS_COUNT], TransportError> {
    let mut positions = [0; AXIS_COUNT];
    for axis in AxisId::ALL {
        positions[axis.slot()] = device.read(axis, Register::CurrentPosition)?;
    }
    Ok(positions)
}

/// Write lower then upper limit for every axis, axis 1 first.
fn write_windows<T: RegisterTransport + ?Sized>(
    device: &mut T,
    windows: &AxisWindows,
) -> Result<(), TransportError> {
    for (axis, window) in windows.iter() {
        device.write(axis, Register::LowerLimit, window.lower)?;
        device.write(axis, Register::UpperLimit, window.upper)?;
    }
    Ok(())
}
