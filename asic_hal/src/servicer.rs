//! Command servicer task.
//!
//! Executes register commands from an external source against the ASIC,
//! under the same gate and timeout policy as the boundary monitor.
//!
//! Each cycle:
//! 1. drain up to `max_batch` pending commands (non-blocking),
//! 2. reject writes to read-only registers without touching the device,
//! 3. acquire the gate, run the remaining commands in arrival order, release,
//! 4. relay every result back to the source.
//!
//! Results are relayed only after the gate is released. On a gate timeout
//! every drained command is answered with the timeout and the device is
//! not touched. How commands reach the source is up to the
//! [`CommandSource`] implementation.

use asic_common::device::config::AsicConfig;
use asic_common::device::transport::{RegisterTransport, TransportError};
use asic_common::device::types::{AxisId, Position, Register};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::error::CycleError;
use crate::gate::DeviceGate;
use crate::task::DeviceTask;

/// A register operation requested by an external client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Read a register
    Read {
        /// Axis to address
        axis: AxisId,
        /// Register to read
        register: Register,
    },
    /// Write a register
    Write {
        /// Axis to address
        axis: AxisId,
        /// Register to write
        register: Register,
        /// Value to write
        value: Position,
    },
}

/// Successful command outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Value returned by a read
    Value(Position),
    /// Write accepted by the device
    Written,
}

/// Result relayed back for each command.
pub type CommandResult = Result<CommandOutcome, CycleError>;

/// Source of external commands and sink for their results.
pub trait CommandSource: Send {
    /// Next pending command, without blocking.
    fn next_command(&mut self) -> Option<Command>;

    /// Deliver the result of a previously returned command.
    fn relay(&mut self, command: Command, result: CommandResult);
}

/// Channel-backed command source.
///
/// Pair it with the [`CommandClient`] returned by [`command_channel`].
pub struct ChannelCommandSource {
    commands: Receiver<Command>,
    replies: Sender<(Command, CommandResult)>,
}

/// Client half of [`command_channel`].
pub struct CommandClient {
    commands: Sender<Command>,
    replies: Receiver<(Command, CommandResult)>,
}

/// The servicer side hung up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("command servicer disconnected")]
pub struct Disconnected;

/// Create a connected client/source pair.
pub fn command_channel() -> (CommandClient, ChannelCommandSource) {
    let (command_tx, command_rx) = mpsc::channel();
    let (reply_tx, reply_rx) = mpsc::channel();
    (
        CommandClient {
            commands: command_tx,
            replies: reply_rx,
        },
        ChannelCommandSource {
            commands: command_rx,
            replies: reply_tx,
        },
    )
}

impl CommandClient {
    /// Queue a command for the next servicer cycle.
    pub fn submit(&self, command: Command) -> Result<(), Disconnected> {
        self.commands.send(command).map_err(|_| Disconnected)
    }

    /// Wait up to `timeout` for the next relayed result.
    pub fn recv_reply(
        &self,
        timeout: Duration,
    ) -> Result<Option<(Command, CommandResult)>, Disconnected> {
        match self.replies.recv_timeout(timeout) {
            Ok(reply) => Ok(Some(reply)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Disconnected),
        }
    }
}

impl CommandSource for ChannelCommandSource {
    fn next_command(&mut self) -> Option<Command> {
        match self.commands.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    fn relay(&mut self, command: Command, result: CommandResult) {
        if self.replies.send((command, result)).is_err() {
            trace!("Dropping reply for {command:?}: client gone");
        }
    }
}

/// Periodic task executing external register commands.
pub struct CommandServicer<T, S> {
    gate: DeviceGate<T>,
    source: S,
    lock_timeout: Duration,
    max_batch: usize,
}

impl<T: RegisterTransport, S: CommandSource> CommandServicer<T, S> {
    /// Create the servicer with explicit settings.
    pub fn new(gate: DeviceGate<T>, source: S, lock_timeout: Duration, max_batch: usize) -> Self {
        Self {
            gate,
            source,
            lock_timeout,
            max_batch: max_batch.max(1),
        }
    }

    /// Create the servicer from the coordinator configuration.
    pub fn from_config(gate: DeviceGate<T>, source: S, config: &AsicConfig) -> Self {
        Self::new(
            gate,
            source,
            config.gate.lock_timeout(),
            config.servicer.max_batch,
        )
    }

    /// Service one batch of commands.
    ///
    /// # Errors
    /// - `CycleError::LockTimeout` if the gate was not acquired; every
    ///   drained command was answered with the timeout.
    /// - `CycleError::Transport` with the first device failure of the
    ///   batch. The other commands still ran.
    pub fn run_cycle(&mut self) -> Result<(), CycleError> {
        let batch: Vec<Command> = std::iter::from_fn(|| self.source.next_command())
            .take(self.max_batch)
            .collect();
        if batch.is_empty() {
            return Ok(());
        }

        let mut results: Vec<Option<CommandResult>> = batch.iter().map(reject_read_only).collect();

        // Everything rejected up front: nothing needs the device.
        if results.iter().all(Option::is_some) {
            for (command, result) in batch.into_iter().zip(results.into_iter().flatten()) {
                self.source.relay(command, result);
            }
            return Ok(());
        }

        let mut device = match self.gate.acquire(self.lock_timeout) {
            Ok(device) => device,
            Err(e) => {
                let err = CycleError::from(e);
                for (command, rejected) in batch.into_iter().zip(results) {
                    self.source.relay(command, rejected.unwrap_or(Err(err.clone())));
                }
                return Err(err);
            }
        };

        let mut first_failure = None;
        for (command, slot) in batch.iter().zip(results.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            let result = execute(&mut *device, command);
            if let Err(e) = &result {
                first_failure.get_or_insert_with(|| e.clone());
            }
            *slot = Some(result.map_err(CycleError::from));
        }
        device.release();

        debug!("Serviced {} commands", batch.len());
        for (command, result) in batch.into_iter().zip(results) {
            if let Some(result) = result {
                self.source.relay(command, result);
            }
        }

        match first_failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl<T: RegisterTransport, S: CommandSource> DeviceTask for CommandServicer<T, S> {
    fn name(&self) -> &'static str {
        "servicer"
    }

    fn cycle(&mut self) -> Result<(), CycleError> {
        self.run_cycle()
    }
}

/// Pre-gate validation: writes to read-only registers are answered at once.
fn reject_read_only(command: &Command) -> Option<CommandResult> {
    match *command {
        Command::Write { axis, register, .. } if !register.is_writable() => {
            warn!("Rejected write to read-only {axis}/{register}");
            Some(Err(TransportError::ReadOnlyRegister { axis, register }.into()))
        }
        _ => None,
    }
}

fn execute<T: RegisterTransport + ?Sized>(
    device: &mut T,
    command: &Command,
) -> Result<CommandOutcome, TransportError> {
    match *command {
        Command::Read { axis, register } => device.read(axis, register).map(CommandOutcome::Value),
        Command::Write {
            axis,
            register,
            value,
        } => device
            .write(axis, register, value)
            .map(|()| CommandOutcome::Written),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transports::simulation::SimulatedAsic;

    const TIMEOUT: Duration = Duration::from_millis(20);

    /// In-memory source recording relayed results.
    #[derive(Default)]
    struct ScriptedSource {
        pending: Vec<Command>,
        relayed: Vec<(Command, CommandResult)>,
    }

    impl CommandSource for ScriptedSource {
        fn next_command(&mut self) -> Option<Command> {
            if self.pending.is_empty() {
                None
            } else {
                Some(self.pending.remove(0))
            }
        }

        fn relay(&mut self, command: Command, result: CommandResult) {
            self.relayed.push((command, result));
        }
    }

    fn servicer(
        commands: Vec<Command>,
        max_batch: usize,
    ) -> (
        CommandServicer<SimulatedAsic, ScriptedSource>,
        DeviceGate<SimulatedAsic>,
    ) {
        let gate = DeviceGate::new(SimulatedAsic::new([0, 100, 300, 350]).with_journal());
        let source = ScriptedSource {
            pending: commands,
            relayed: Vec::new(),
        };
        (
            CommandServicer::new(gate.clone(), source, TIMEOUT, max_batch),
            gate,
        )
    }

    #[test]
    fn idle_cycle_does_not_take_gate() {
        let (mut servicer, gate) = servicer(Vec::new(), 4);
        assert!(servicer.run_cycle().is_ok());
        assert_eq!(gate.stats().acquisitions, 0);
    }

    #[test]
    fn executes_commands_in_order_and_relays_results() {
        let axis = AxisId::ALL[1];
        let commands = vec![
            Command::Write {
                axis,
                register: Register::UpperLimit,
                value: 123,
            },
            Command::Read {
                axis,
                register: Register::UpperLimit,
            },
            Command::Read {
                axis,
                register: Register::CurrentPosition,
            },
        ];
        let (mut servicer, _gate) = servicer(commands.clone(), 8);

        servicer.run_cycle().unwrap();

        let relayed = &servicer.source.relayed;
        assert_eq!(relayed.len(), 3);
        assert_eq!(relayed[0], (commands[0], Ok(CommandOutcome::Written)));
        assert_eq!(relayed[1], (commands[1], Ok(CommandOutcome::Value(123))));
        assert_eq!(relayed[2], (commands[2], Ok(CommandOutcome::Value(100))));
    }

    #[test]
    fn batch_size_is_bounded() {
        let commands = vec![
            Command::Read {
                axis: AxisId::ALL[0],
                register: Register::CurrentPosition,
            };
            5
        ];
        let (mut servicer, _gate) = servicer(commands, 2);

        servicer.run_cycle().unwrap();
        assert_eq!(servicer.source.relayed.len(), 2);
        assert_eq!(servicer.source.pending.len(), 3);
    }

    #[test]
    fn timeout_answers_every_command_without_touching_device() {
        let commands = vec![
            Command::Read {
                axis: AxisId::ALL[0],
                register: Register::CurrentPosition,
            },
            Command::Write {
                axis: AxisId::ALL[0],
                register: Register::LowerLimit,
                value: 1,
            },
        ];
        let (mut servicer, gate) = servicer(commands, 8);
        let held = gate.acquire(TIMEOUT).unwrap();

        let result = servicer.run_cycle();

        assert!(matches!(result, Err(CycleError::LockTimeout { .. })));
        assert!(held.journal().is_empty());
        assert_eq!(servicer.source.relayed.len(), 2);
        assert!(servicer
            .source
            .relayed
            .iter()
            .all(|(_, r)| matches!(r, Err(CycleError::LockTimeout { .. }))));
    }

    #[test]
    fn read_only_write_rejected_before_gate() {
        let axis = AxisId::ALL[3];
        let command = Command::Write {
            axis,
            register: Register::CurrentPosition,
            value: 9,
        };
        let (mut servicer, gate) = servicer(vec![command], 8);

        assert!(servicer.run_cycle().is_ok());
        assert_eq!(gate.stats().acquisitions, 0);
        assert_eq!(
            servicer.source.relayed,
            vec![(
                command,
                Err(CycleError::Transport(TransportError::ReadOnlyRegister {
                    axis,
                    register: Register::CurrentPosition
                }))
            )]
        );
    }

    #[test]
    fn mixed_batch_takes_gate_once_and_keeps_order() {
        let axis = AxisId::ALL[0];
        let rejected = Command::Write {
            axis,
            register: Register::CurrentPosition,
            value: 1,
        };
        let read = Command::Read {
            axis,
            register: Register::CurrentPosition,
        };
        let (mut servicer, gate) = servicer(vec![rejected, read], 8);

        assert!(servicer.run_cycle().is_ok());
        assert_eq!(gate.stats().acquisitions, 1);
        let relayed = &servicer.source.relayed;
        assert_eq!(relayed[0].0, rejected);
        assert!(relayed[0].1.is_err());
        assert_eq!(relayed[1], (read, Ok(CommandOutcome::Value(0))));
        assert_eq!(gate.acquire(TIMEOUT).unwrap().journal().len(), 1);
    }

    #[test]
    fn device_failure_reported_per_command_and_batch_continues() {
        let faulty = AxisId::ALL[2];
        let commands = vec![
            Command::Read {
                axis: faulty,
                register: Register::CurrentPosition,
            },
            Command::Read {
                axis: AxisId::ALL[3],
                register: Register::CurrentPosition,
            },
        ];
        let (mut servicer, gate) = servicer(commands, 8);
        gate.acquire(TIMEOUT).unwrap().set_faulty_axis(Some(faulty));

        let result = servicer.run_cycle();

        assert!(matches!(result, Err(CycleError::Transport(_))));
        let relayed = &servicer.source.relayed;
        assert!(relayed[0].1.is_err());
        assert_eq!(relayed[1].1, Ok(CommandOutcome::Value(350)));
        assert!(!gate.is_held());
    }

    #[test]
    fn channel_source_round_trip() {
        let (client, source) = command_channel();
        let gate = DeviceGate::new(SimulatedAsic::new([5, 6, 7, 8]));
        let mut servicer = CommandServicer::new(gate, source, TIMEOUT, 4);

        let command = Command::Read {
            axis: AxisId::ALL[2],
            register: Register::CurrentPosition,
        };
        client.submit(command).unwrap();
        servicer.run_cycle().unwrap();

        let reply = client.recv_reply(Duration::from_secs(1)).unwrap();
        assert_eq!(reply, Some((command, Ok(CommandOutcome::Value(7)))));
        assert_eq!(client.recv_reply(Duration::from_millis(5)).unwrap(), None);
    }

    #[test]
    fn client_sees_disconnect_after_servicer_dropped() {
        let (client, source) = command_channel();
        drop(source);
        assert_eq!(
            client.submit(Command::Read {
                axis: AxisId::ALL[0],
                register: Register::EnvConfig,
            }),
            Err(Disconnected)
        );
    }
}
