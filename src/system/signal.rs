use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, Signal, System};
use thiserror::Error;

use super::lifecycle::{LifecycleCommand, SignalSink};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("no such process (pid {0})")]
    NoSuchProcess(u32),
    #[error("process {0} has already exited")]
    AlreadyExited(u32),
    #[error("failed to send {signal} to pid {pid} (permission denied?)")]
    Refused { pid: u32, signal: &'static str },
    #[error("{signal} is not supported on this platform")]
    Unsupported { signal: &'static str },
}

impl LifecycleCommand {
    fn signal(self) -> Signal {
        match self {
            LifecycleCommand::Terminate => Signal::Kill,
            LifecycleCommand::Pause => Signal::Stop,
        }
    }

    fn signal_name(self) -> &'static str {
        match self {
            LifecycleCommand::Terminate => "SIGKILL",
            LifecycleCommand::Pause => "SIGSTOP",
        }
    }
}

/// Signals processes through sysinfo. Each call looks the target up afresh,
/// so it is safe to share between worker threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoSignalSink;

impl SignalSink for SysinfoSignalSink {
    fn send(&self, pid: u32, command: LifecycleCommand) -> Result<(), SignalError> {
        let target = Pid::from_u32(pid);
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[target]),
            true,
            ProcessRefreshKind::nothing(),
        );

        let process = sys.process(target).ok_or(SignalError::NoSuchProcess(pid))?;
        if matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead) {
            return Err(SignalError::AlreadyExited(pid));
        }

        let signal_name = command.signal_name();
        match process.kill_with(command.signal()) {
            Some(true) => Ok(()),
            Some(false) => Err(SignalError::Refused {
                pid,
                signal: signal_name,
            }),
            None => match command {
                // Platforms without signals still support a plain kill.
                LifecycleCommand::Terminate if process.kill() => Ok(()),
                LifecycleCommand::Terminate => Err(SignalError::Refused {
                    pid,
                    signal: signal_name,
                }),
                LifecycleCommand::Pause => Err(SignalError::Unsupported {
                    signal: signal_name,
                }),
            },
        }
    }
}
