//! Cadence timing and the shutdown signal.
//!
//! Tasks sleep between cycles by waiting on the [`ShutdownSignal`] with a
//! timeout, so a shutdown request wakes them immediately instead of after a
//! full cadence.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Process-wide stop request shared by the runtime, the tasks and the
/// signal handler.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<SignalInner>,
}

#[derive(Default)]
struct SignalInner {
    triggered: Mutex<bool>,
    wakeup: Condvar,
}

impl ShutdownSignal {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown and wake every waiting task.
    pub fn trigger(&self) {
        let mut triggered = self.inner.triggered.lock();
        *triggered = true;
        self.inner.wakeup.notify_all();
    }

    /// Whether shutdown was requested.
    pub fn is_triggered(&self) -> bool {
        *self.inner.triggered.lock()
    }

    /// Sleep for `timeout` unless shutdown is requested first.
    ///
    /// Returns `true` if shutdown was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut triggered = self.inner.triggered.lock();
        while !*triggered {
            if self
                .inner
                .wakeup
                .wait_until(&mut triggered, deadline)
                .timed_out()
            {
                break;
            }
        }
        *triggered
    }
}

/// Fixed-rate cadence for a periodic task.
///
/// Each cycle sleeps for whatever is left of the interval after the work;
/// a cycle that takes longer than the interval is an overrun and the next
/// cycle starts immediately.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval: Duration,
}

impl Cadence {
    /// Cadence with the given interval.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Interval between cycle starts.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next tick for a cycle started at `cycle_start`,
    /// or `None` if the cycle overran.
    pub fn remaining(&self, cycle_start: Instant) -> Option<Duration> {
        let elapsed = cycle_start.elapsed();
        if elapsed < self.interval {
            Some(self.interval - elapsed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn wait_times_out_without_trigger() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn trigger_wakes_waiter_early() {
        let signal = ShutdownSignal::new();
        let waiter = {
            let signal = signal.clone();
            thread::spawn(move || {
                let start = Instant::now();
                let stopped = signal.wait_timeout(Duration::from_secs(10));
                (stopped, start.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(20));
        signal.trigger();

        let (stopped, waited) = waiter.join().unwrap();
        assert!(stopped);
        assert!(waited < Duration::from_secs(5));
        assert!(signal.is_triggered());
    }

    #[test]
    fn wait_returns_immediately_once_triggered() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        assert!(signal.wait_timeout(Duration::from_secs(10)));
    }

    #[test]
    fn cadence_remaining_and_overrun() {
        let cadence = Cadence::new(Duration::from_millis(50));
        assert!(cadence.remaining(Instant::now()).is_some());

        let long_ago = Instant::now() - Duration::from_millis(80);
        assert_eq!(cadence.remaining(long_ago), None);
    }
}
