//! Axis boundary computation.
//!
//! Each axis may travel up to the midpoint between its own position and the
//! next axis's position. The first axis is open towards `MIN_POSITION`, the
//! last towards `MAX_POSITION`, and neighbouring windows share their
//! boundary:
//!
//! ```text
//!   MIN ├── axis1 ──┤── axis2 ──┤── axis3 ──┤── axis4 ──┤ MAX
//!        P1       m12   P2     m23   P3    m34   P4
//! ```
//!
//! Axis order is fixed by installation, so positions are expected to be
//! ascending by axis index. Out-of-order positions are not corrected; they
//! produce inverted windows, which [`inverted_pairs`] reports.

use asic_common::device::consts::{AXIS_COUNT, MAX_POSITION, MIN_POSITION};
use asic_common::device::types::{AxisId, AxisWindows, Position, Window};

/// Midpoint rule: `low + (high - low) / 2`, truncating toward zero.
///
/// Evaluated in 64 bits so the difference cannot overflow.
pub fn midpoint(low: Position, high: Position) -> Position {
    let low = i64::from(low);
    let high = i64::from(high);
    // Result lies between `low` and `high`, so it always fits.
    (low + (high - low) / 2) as Position
}

/// Compute the travel windows for positions ordered by axis slot.
pub fn compute_windows(positions: [Position; AXIS_COUNT]) -> AxisWindows {
    let mut windows = [Window::new(MIN_POSITION, MAX_POSITION); AXIS_COUNT];
    let mut lower = MIN_POSITION;

    for slot in 0..AXIS_COUNT {
        let upper = match positions.get(slot + 1) {
            Some(&next) => midpoint(positions[slot], next),
            None => MAX_POSITION,
        };
        windows[slot] = Window::new(lower, upper);
        lower = upper;
    }

    AxisWindows::new(windows)
}

/// Adjacent axis pairs whose positions are out of installation order.
pub fn inverted_pairs(positions: &[Position; AXIS_COUNT]) -> Vec<(AxisId, AxisId)> {
    AxisId::ALL
        .into_iter()
        .filter_map(|axis| axis.next().map(|above| (axis, above)))
        .filter(|&(below, above)| positions[below.slot()] > positions[above.slot()])
        .collect()
}
