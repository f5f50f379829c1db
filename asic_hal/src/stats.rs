//! Per-task cycle statistics.
//!
//! Counters are atomics so the runtime can read them while the task thread
//! updates them. A cycle is counted before its outcome, and snapshots read
//! the outcome counters first, so a live snapshot never shows more skipped
//! cycles than cycles.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::error::CycleError;

/// Live counters for one periodic task.
#[derive(Debug, Default)]
pub struct TaskStats {
    cycles: AtomicU64,
    skipped: AtomicU64,
    lock_timeouts: AtomicU64,
    transport_failures: AtomicU64,
    overruns: AtomicU64,
    max_cycle_us: AtomicU64,
    total_cycle_us: AtomicU64,
    init_failed: AtomicBool,
}

/// Point-in-time copy of [`TaskStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStatsSnapshot {
    /// Cycles executed, including skipped ones
    pub cycles: u64,
    /// Cycles that ended with an error
    pub skipped: u64,
    /// Cycles skipped because the gate timed out
    pub lock_timeouts: u64,
    /// Cycles cut short by a transport failure
    pub transport_failures: u64,
    /// Cycles that exceeded the cadence
    pub overruns: u64,
    /// Longest cycle in microseconds
    pub max_cycle_us: u64,
    /// Average cycle in microseconds
    pub avg_cycle_us: u64,
    /// Whether the init phase failed
    pub init_failed: bool,
}

impl TaskStatsSnapshot {
    /// Cycles that completed without error.
    pub fn completed(&self) -> u64 {
        self.cycles.saturating_sub(self.skipped)
    }
}

impl TaskStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome and duration of one cycle.
    pub fn record_cycle(&self, outcome: &Result<(), CycleError>, elapsed: Duration) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Ok(()) => {}
            Err(CycleError::LockTimeout { .. }) => {
                self.lock_timeouts.fetch_add(1, Ordering::Release);
                self.skipped.fetch_add(1, Ordering::Release);
            }
            Err(CycleError::Transport(_)) => {
                self.transport_failures.fetch_add(1, Ordering::Release);
                self.skipped.fetch_add(1, Ordering::Release);
            }
        }

        let us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.total_cycle_us.fetch_add(us, Ordering::Relaxed);
        self.max_cycle_us.fetch_max(us, Ordering::Relaxed);
    }

    /// Record a cycle that exceeded its cadence.
    pub fn record_overrun(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed init phase.
    pub fn record_init_failure(&self) {
        self.init_failed.store(true, Ordering::Relaxed);
    }

    /// Number of cycles executed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Copy the current counters.
    pub fn snapshot(&self) -> TaskStatsSnapshot {
        let skipped = self.skipped.load(Ordering::Acquire);
        let lock_timeouts = self.lock_timeouts.load(Ordering::Acquire);
        let transport_failures = self.transport_failures.load(Ordering::Acquire);
        let cycles = self.cycles.load(Ordering::Relaxed);
        let total = self.total_cycle_us.load(Ordering::Relaxed);
        TaskStatsSnapshot {
            cycles,
            skipped,
            lock_timeouts,
            transport_failures,
            overruns: self.overruns.load(Ordering::Relaxed),
            max_cycle_us: self.max_cycle_us.load(Ordering::Relaxed),
            avg_cycle_us: if cycles > 0 { total / cycles } else { 0 },
            init_failed: self.init_failed.load(Ordering::Relaxed),
        }
    }
}
