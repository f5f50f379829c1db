//! Device access gate.
//!
//! The ASIC has no internal concurrency safety, so every task that talks to
//! it goes through one `DeviceGate`. The gate owns the register transport;
//! the only way to reach the transport is through a `GateGuard`, which is
//! handed out to one holder at a time after a bounded wait.
//!
//! ```text
//!  BoundaryMonitor ──┐                     ┌──────────────────────┐
//!                    ├── acquire(timeout) ─►│ DeviceGate           │
//!  CommandServicer ──┘                     │  Mutex<Transport>    │
//!                                          └──────────────────────┘
//! ```
//!
//! Releasing is done by dropping the guard (or calling
//! [`GateGuard::release`]), so a task can never release a gate it does not
//! hold. The gate is not re-entrant: a holder that calls `acquire` again
//! waits out its own timeout and gets `GateError::LockTimeout`.

use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

use crate::error::GateError;

/// Shared handle to the device gate.
///
/// Cloning is cheap; all clones guard the same transport.
pub struct DeviceGate<T> {
    inner: Arc<GateInner<T>>,
}

struct GateInner<T> {
    transport: Mutex<T>,
    acquisitions: AtomicU64,
    timeouts: AtomicU64,
}

/// Contention counters for a gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GateStats {
    /// Successful acquisitions
    pub acquisitions: u64,
    /// Acquisitions that timed out
    pub timeouts: u64,
}

impl<T> DeviceGate<T> {
    /// Create the gate around the transport it protects.
    pub fn new(transport: T) -> Self {
        Self {
            inner: Arc::new(GateInner {
                transport: Mutex::new(transport),
                acquisitions: AtomicU64::new(0),
                timeouts: AtomicU64::new(0),
            }),
        }
    }

    /// Obtain exclusive access within `timeout`.
    ///
    /// # Errors
    /// Returns `GateError::LockTimeout` if another holder kept the gate for
    /// the whole wait. The caller must then skip its cycle.
    pub fn acquire(&self, timeout: Duration) -> Result<GateGuard<'_, T>, GateError> {
        match self.inner.transport.try_lock_for(timeout) {
            Some(guard) => {
                self.inner.acquisitions.fetch_add(1, Ordering::Relaxed);
                trace!("Device gate acquired");
                Ok(GateGuard { guard })
            }
            None => {
                self.inner.timeouts.fetch_add(1, Ordering::Relaxed);
                Err(GateError::LockTimeout { timeout })
            }
        }
    }

    /// Whether some task currently holds the gate.
    pub fn is_held(&self) -> bool {
        self.inner.transport.is_locked()
    }

    /// Snapshot of the contention counters.
    pub fn stats(&self) -> GateStats {
        GateStats {
            acquisitions: self.inner.acquisitions.load(Ordering::Relaxed),
            timeouts: self.inner.timeouts.load(Ordering::Relaxed),
        }
    }
}

impl<T> Clone for DeviceGate<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Exclusive access to the transport while the gate is held.
pub struct GateGuard<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> GateGuard<'_, T> {
    /// Release the gate explicitly.
    pub fn release(self) {
        trace!("Device gate released");
    }
}

impl<T> Deref for GateGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for GateGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
