//! Coordinator runtime.
//!
//! Wires the gate, the boundary monitor and the command servicer together
//! and runs each task on its own named OS thread.
//!
//! ```text
//!              ┌─────────────── AsicRuntime::start ───────────────┐
//!              │                                                  │
//!   thread "asic-monitor"                          thread "asic-servicer"
//!   run_periodic(BoundaryMonitor)                  run_periodic(CommandServicer)
//!              │                                                  │
//!              └──────────► DeviceGate<T> (one transport) ◄───────┘
//! ```
//!
//! Shutdown is cooperative: [`ShutdownSignal::trigger`] wakes both loops,
//! they finish their current cycle and [`RuntimeHandle::wait`] joins them.

use asic_common::device::config::AsicConfig;
use asic_common::device::transport::RegisterTransport;
use serde::Serialize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

use crate::cadence::{Cadence, ShutdownSignal};
use crate::error::CoreError;
use crate::gate::{DeviceGate, GateStats};
use crate::monitor::BoundaryMonitor;
use crate::servicer::{CommandServicer, CommandSource};
use crate::stats::{TaskStats, TaskStatsSnapshot};
use crate::task::{DeviceTask, LoopOptions, run_periodic};

/// Thread settings for one task.
#[derive(Debug, Clone, Copy)]
struct ThreadSettings {
    thread_name: &'static str,
    stack_size: usize,
    priority: u8,
    options: LoopOptions,
}

/// Configured, not yet started coordinator.
pub struct AsicRuntime<T, S> {
    config: AsicConfig,
    gate: DeviceGate<T>,
    source: S,
    shutdown: ShutdownSignal,
    cycle_limit: Option<u64>,
}

impl<T, S> AsicRuntime<T, S>
where
    T: RegisterTransport + 'static,
    S: CommandSource + 'static,
{
    /// Build the runtime around a transport and a command source.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if the configuration is invalid.
    pub fn new(config: AsicConfig, transport: T, source: S) -> Result<Self, CoreError> {
        config.validate()?;
        info!(
            "Runtime configured: transport={}, lock_timeout={}ms, monitor={}ms, servicer={}ms",
            transport.name(),
            config.gate.lock_timeout_ms,
            config.monitor.cadence_ms,
            config.servicer.cadence_ms
        );
        Ok(Self {
            config,
            gate: DeviceGate::new(transport),
            source,
            shutdown: ShutdownSignal::new(),
            cycle_limit: None,
        })
    }

    /// Stop the runtime once the monitor has run `cycles` cycles.
    pub fn with_cycle_limit(mut self, cycles: u64) -> Self {
        self.cycle_limit = Some(cycles);
        self
    }

    /// Signal that stops the runtime; safe to hand to a signal handler.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Handle to the device gate shared by both tasks.
    pub fn gate(&self) -> DeviceGate<T> {
        self.gate.clone()
    }

    /// Spawn the monitor and servicer threads.
    ///
    /// # Errors
    /// Returns `CoreError::SpawnFailed` if a thread cannot be created. A
    /// task that was already running is stopped and joined first.
    pub fn start(self) -> Result<RuntimeHandle<T>, CoreError> {
        let Self {
            config,
            gate,
            source,
            shutdown,
            cycle_limit,
        } = self;

        let rt_mode = if detect_rt_mode() { "on" } else { "off" };
        info!("Real-time scheduling: {rt_mode}");

        let monitor = BoundaryMonitor::from_config(gate.clone(), &config);
        let monitor_thread = ThreadSettings {
            thread_name: "asic-monitor",
            stack_size: config.monitor.stack_size,
            priority: config.monitor.priority,
            options: LoopOptions {
                cadence: Cadence::new(config.monitor.cadence()),
                stop_after: cycle_limit,
            },
        };
        let monitor = spawn_task(monitor, monitor_thread, &shutdown)?;

        let servicer = CommandServicer::from_config(gate.clone(), source, &config);
        let servicer_thread = ThreadSettings {
            thread_name: "asic-servicer",
            stack_size: config.servicer.stack_size,
            priority: config.servicer.priority,
            options: LoopOptions {
                cadence: Cadence::new(config.servicer.cadence()),
                stop_after: None,
            },
        };
        let servicer = match spawn_task(servicer, servicer_thread, &shutdown) {
            Ok(handle) => handle,
            Err(e) => {
                shutdown.trigger();
                monitor.join();
                return Err(e);
            }
        };

        info!("Runtime started");
        Ok(RuntimeHandle {
            gate,
            shutdown,
            monitor,
            servicer,
        })
    }
}

/// A spawned task thread and its live statistics.
struct TaskHandle {
    name: &'static str,
    stats: Arc<TaskStats>,
    thread: JoinHandle<()>,
}

impl TaskHandle {
    fn join(self) -> TaskStatsSnapshot {
        if self.thread.join().is_err() {
            error!("[{}] Task thread panicked", self.name);
        }
        self.stats.snapshot()
    }
}

/// Running coordinator.
pub struct RuntimeHandle<T> {
    gate: DeviceGate<T>,
    shutdown: ShutdownSignal,
    monitor: TaskHandle,
    servicer: TaskHandle,
}

/// Final statistics of a stopped runtime.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuntimeReport {
    /// Boundary monitor counters
    pub monitor: TaskStatsSnapshot,
    /// Command servicer counters
    pub servicer: TaskStatsSnapshot,
    /// Gate contention counters
    pub gate: GateStats,
}

impl<T> RuntimeHandle<T> {
    /// Signal that stops the runtime.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Handle to the device gate shared by both tasks.
    pub fn gate(&self) -> DeviceGate<T> {
        self.gate.clone()
    }

    /// Live statistics of both tasks.
    pub fn snapshot(&self) -> (TaskStatsSnapshot, TaskStatsSnapshot) {
        (self.monitor.stats.snapshot(), self.servicer.stats.snapshot())
    }

    /// Block until both tasks have stopped.
    pub fn wait(self) -> RuntimeReport {
        let monitor = self.monitor.join();
        let servicer = self.servicer.join();
        info!("Runtime stopped");
        RuntimeReport {
            monitor,
            servicer,
            gate: self.gate.stats(),
        }
    }

    /// Request shutdown and wait for both tasks.
    pub fn shutdown(self) -> RuntimeReport {
        info!("Shutdown requested");
        self.shutdown.trigger();
        self.wait()
    }
}

fn spawn_task<D>(
    mut task: D,
    settings: ThreadSettings,
    shutdown: &ShutdownSignal,
) -> Result<TaskHandle, CoreError>
where
    D: DeviceTask + 'static,
{
    let name = task.name();
    let stats = Arc::new(TaskStats::new());
    let thread_stats = Arc::clone(&stats);
    let shutdown = shutdown.clone();

    let thread = thread::Builder::new()
        .name(settings.thread_name.to_string())
        .stack_size(settings.stack_size)
        .spawn(move || {
            apply_priority(name, settings.priority);
            run_periodic(&mut task, settings.options, &shutdown, &thread_stats);
        })
        .map_err(|e| CoreError::SpawnFailed {
            task: name,
            reason: e.to_string(),
        })?;

    debug!(
        "[{name}] Spawned thread '{}' (stack={}B, priority={})",
        settings.thread_name, settings.stack_size, settings.priority
    );
    Ok(TaskHandle {
        name,
        stats,
        thread,
    })
}

/// Apply the configured priority to the calling thread as SCHED_FIFO.
///
/// Best effort: without permission the task keeps the default policy.
#[cfg(all(feature = "rt", target_os = "linux"))]
fn apply_priority(task: &str, priority: u8) {
    let param = libc::sched_param {
        sched_priority: i32::from(priority),
    };
    let ret =
        unsafe { libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::from_raw_os_error(ret);
        tracing::warn!("[{task}] SCHED_FIFO priority {priority} not applied: {err}");
    } else {
        info!("[{task}] Running at SCHED_FIFO priority {priority}");
    }
}

#[cfg(not(all(feature = "rt", target_os = "linux")))]
fn apply_priority(task: &str, priority: u8) {
    debug!("[{task}] Priority {priority} not applied (rt feature off)");
}

/// Detect if the process already runs under a real-time policy.
fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        use libc::{SCHED_FIFO, SCHED_RR, sched_getscheduler};
        let policy = unsafe { sched_getscheduler(0) };
        policy == SCHED_FIFO || policy == SCHED_RR
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}
