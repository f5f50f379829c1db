//! Periodic device task trait and loop.
//!
//! Both the boundary monitor and the command servicer implement
//! [`DeviceTask`]; [`run_periodic`] drives either of them at its cadence
//! until shutdown.
//!
//! # Lifecycle
//!
//! 1. `init()` - Called once before the first cycle. Failure is logged and
//!    the loop starts anyway.
//! 2. `cycle()` - Called every cadence tick. Errors skip the cycle and are
//!    logged; the loop always continues.

use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cadence::{Cadence, ShutdownSignal};
use crate::error::{CycleError, InitFailure};
use crate::stats::TaskStats;

/// A task that talks to the ASIC on a fixed cadence.
pub trait DeviceTask: Send {
    /// Task name used for logging and the thread name.
    fn name(&self) -> &'static str;

    /// One-time setup before the periodic loop.
    ///
    /// Default implementation does nothing.
    fn init(&mut self) -> Result<(), InitFailure> {
        Ok(())
    }

    /// One cycle of work. Must not hold the device gate on return.
    fn cycle(&mut self) -> Result<(), CycleError>;
}

/// Loop control for [`run_periodic`].
#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    /// Interval between cycle starts
    pub cadence: Cadence,
    /// Stop the whole runtime after this many cycles (smoke runs and tests)
    pub stop_after: Option<u64>,
}

/// Run `task` until `shutdown` is triggered.
///
/// Never returns early on a cycle error: every error is cycle-scoped.
pub fn run_periodic<T: DeviceTask + ?Sized>(
    task: &mut T,
    options: LoopOptions,
    shutdown: &ShutdownSignal,
    stats: &TaskStats,
) {
    let name = task.name();

    if let Err(e) = task.init() {
        stats.record_init_failure();
        error!("[{name}] {e}; continuing without init");
    }

    info!(
        "[{name}] Starting periodic loop (cadence={}ms)",
        options.cadence.interval().as_millis()
    );

    while !shutdown.is_triggered() {
        let cycle_start = Instant::now();
        let outcome = task.cycle();

        match &outcome {
            Ok(()) => {}
            Err(e @ CycleError::LockTimeout { .. }) => {
                warn!("[{name}] Cycle skipped: {e}");
            }
            Err(e @ CycleError::Transport(_)) => {
                error!("[{name}] Cycle aborted: {e}");
            }
        }
        stats.record_cycle(&outcome, cycle_start.elapsed());

        let cycles = stats.cycles();
        if cycles % 100 == 0 {
            let snap = stats.snapshot();
            debug!(
                "[{name}] {} cycles, skipped={}, avg={}us, max={}us, overruns={}",
                snap.cycles, snap.skipped, snap.avg_cycle_us, snap.max_cycle_us, snap.overruns
            );
        }

        if options.stop_after.is_some_and(|limit| cycles >= limit) {
            info!("[{name}] Cycle limit {cycles} reached, requesting shutdown");
            shutdown.trigger();
            break;
        }

        match options.cadence.remaining(cycle_start) {
            Some(remaining) => {
                if shutdown.wait_timeout(remaining) {
                    break;
                }
            }
            None => {
                stats.record_overrun();
                debug!("[{name}] Cycle overran its cadence");
            }
        }
    }

    info!("[{name}] Stopped after {} cycles", stats.cycles());
}
