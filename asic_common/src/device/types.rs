//! Axis, register and window types.
//!
//! This module defines the data model shared by every component that talks
//! to the ASIC:
//! - `AxisId` - One of the four axes, index 1..=4
//! - `Register` - Addressable per-axis register
//! - `Window` / `AxisWindows` - Travel limits computed by the boundary monitor

use crate::device::consts::AXIS_COUNT;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Signed axis position in device units.
pub type Position = i32;

/// Returned when an axis index falls outside 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("axis index {0} out of range 1..=4")]
pub struct InvalidAxis(pub u8);

/// Identifies one of the ASIC's axes.
///
/// Always holds an index in `1..=AXIS_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AxisId(u8);

impl AxisId {
    /// All axes in increasing index order.
    pub const ALL: [AxisId; AXIS_COUNT] = [AxisId(1), AxisId(2), AxisId(3), AxisId(4)];

    /// Create an axis id from its 1-based index.
    pub fn new(index: u8) -> Result<Self, InvalidAxis> {
        if (1..=AXIS_COUNT as u8).contains(&index) {
            Ok(Self(index))
        } else {
            Err(InvalidAxis(index))
        }
    }

    /// 1-based axis index as used by the device.
    pub fn index(self) -> u8 {
        self.0
    }

    /// 0-based slot for array storage.
    pub fn slot(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// The next axis up, if any.
    pub fn next(self) -> Option<AxisId> {
        AxisId::new(self.0 + 1).ok()
    }
}

impl TryFrom<u8> for AxisId {
    type Error = InvalidAxis;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        AxisId::new(index)
    }
}

impl From<AxisId> for u8 {
    fn from(axis: AxisId) -> Self {
        axis.0
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "axis{}", self.0)
    }
}

/// Addressable per-axis register on the ASIC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Register {
    /// Current position, reflects physical state. Read-only.
    CurrentPosition,
    /// Operating mode, written once during init.
    EnvConfig,
    /// Lower travel limit.
    LowerLimit,
    /// Upper travel limit.
    UpperLimit,
}

impl Register {
    /// Whether the register accepts writes.
    pub fn is_writable(self) -> bool {
        !matches!(self, Register::CurrentPosition)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Register::CurrentPosition => "current_position",
            Register::EnvConfig => "env_config",
            Register::LowerLimit => "lower_limit",
            Register::UpperLimit => "upper_limit",
        };
        f.write_str(name)
    }
}

/// Allowed travel range of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Lower limit (inclusive)
    pub lower: Position,
    /// Upper limit (inclusive)
    pub upper: Position,
}

impl Window {
    /// Create a window from its limits.
    pub fn new(lower: Position, upper: Position) -> Self {
        Self { lower, upper }
    }

    /// True when the limits are swapped, which happens only when the
    /// positions the window was computed from were out of axis order.
    pub fn is_inverted(&self) -> bool {
        self.lower > self.upper
    }
}

/// Windows for all axes computed in one monitor cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisWindows([Window; AXIS_COUNT]);

impl AxisWindows {
    /// Wrap windows ordered by axis slot.
    pub fn new(windows: [Window; AXIS_COUNT]) -> Self {
        Self(windows)
    }

    /// Window of a single axis.
    pub fn get(&self, axis: AxisId) -> Window {
        self.0[axis.slot()]
    }

    /// Iterate `(axis, window)` pairs in axis order.
    pub fn iter(&self) -> impl Iterator<Item = (AxisId, Window)> + '_ {
        AxisId::ALL.into_iter().zip(self.0.iter().copied())
    }
}
