//! Terminate/pause commands, executed off the sampling path.
//!
//! The runner hands each request to the blocking pool so that a target which
//! is slow to respond cannot delay metric collection or the next table
//! cycle. Outcomes come back as values, never as errors or panics, and are
//! also posted to a completion channel drained by the poller.
//!
//! The runner acts on every request it is given. Front ends gate requests
//! with [`authorize`] first, which also writes the `audit` trail.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use super::signal::SignalError;
use crate::config::OperatorRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleCommand {
    Terminate,
    Pause,
}

impl LifecycleCommand {
    pub fn label(self) -> &'static str {
        match self {
            LifecycleCommand::Terminate => "terminate",
            LifecycleCommand::Pause => "pause",
        }
    }
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Performs the OS-level effect of a command.
pub trait SignalSink: Send + Sync + 'static {
    fn send(&self, pid: u32, command: LifecycleCommand) -> Result<(), SignalError>;
}

/// Who a command is issued for. Carried through to every outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requester {
    pub operator: String,
    pub role: OperatorRole,
}

impl Requester {
    pub fn new(operator: impl Into<String>, role: OperatorRole) -> Self {
        Requester {
            operator: operator.into(),
            role,
        }
    }
}

impl Default for Requester {
    fn default() -> Self {
        Requester::new("unknown", OperatorRole::Viewer)
    }
}

/// Logs the request and, for roles that may not signal, the denial.
/// Returns the denial text for the status line.
pub fn authorize(requester: &Requester, command: LifecycleCommand, pid: u32) -> Result<(), String> {
    let role = requester.role.label();
    tracing::info!(
        target: "audit",
        operator = %requester.operator,
        role,
        action = %command,
        pid,
        "lifecycle command requested"
    );

    if requester.role.can_signal() {
        return Ok(());
    }
    tracing::warn!(
        target: "audit",
        operator = %requester.operator,
        role,
        action = %command,
        pid,
        success = false,
        details = "permission denied",
        "lifecycle command denied"
    );
    Err(format!("Permission denied: {role} cannot {command} PID {pid}"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub command: LifecycleCommand,
    pub pid: u32,
    pub operator: String,
    pub role: OperatorRole,
    pub ok: bool,
    /// Empty on success, a human-readable reason otherwise.
    pub error: String,
}

impl CommandOutcome {
    fn success(command: LifecycleCommand, pid: u32, requester: &Requester) -> Self {
        CommandOutcome {
            command,
            pid,
            operator: requester.operator.clone(),
            role: requester.role,
            ok: true,
            error: String::new(),
        }
    }

    fn failure(
        command: LifecycleCommand,
        pid: u32,
        requester: &Requester,
        error: impl Into<String>,
    ) -> Self {
        let mut error = error.into();
        if error.is_empty() {
            error = format!("{command} failed for pid {pid}");
        }
        CommandOutcome {
            command,
            pid,
            operator: requester.operator.clone(),
            role: requester.role,
            ok: false,
            error,
        }
    }

    pub fn message(&self) -> String {
        if self.ok {
            format!("Sent {} to PID {}", self.command, self.pid)
        } else {
            format!("Failed to {} PID {}: {}", self.command, self.pid, self.error)
        }
    }
}

pub type CompletionReceiver = mpsc::UnboundedReceiver<CommandOutcome>;

#[derive(Clone)]
pub struct LifecycleCommandRunner {
    sink: Arc<dyn SignalSink>,
    requester: Arc<Requester>,
    completions: mpsc::UnboundedSender<CommandOutcome>,
}

impl LifecycleCommandRunner {
    pub fn new(sink: Arc<dyn SignalSink>) -> (Self, CompletionReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            LifecycleCommandRunner {
                sink,
                requester: Arc::new(Requester::default()),
                completions: tx,
            },
            rx,
        )
    }

    pub fn with_requester(mut self, requester: Requester) -> Self {
        self.requester = Arc::new(requester);
        self
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    /// Runs one command on a blocking worker and waits for its outcome.
    pub async fn execute(&self, command: LifecycleCommand, pid: u32) -> CommandOutcome {
        let sink = Arc::clone(&self.sink);
        let joined = tokio::task::spawn_blocking(move || sink.send(pid, command)).await;
        let requester = self.requester.as_ref();
        let outcome = match joined {
            Ok(Ok(())) => CommandOutcome::success(command, pid, requester),
            Ok(Err(err)) => CommandOutcome::failure(command, pid, requester, err.to_string()),
            Err(join_err) => CommandOutcome::failure(
                command,
                pid,
                requester,
                format!("{command} worker aborted: {join_err}"),
            ),
        };
        tracing::debug!(%command, pid, ok = outcome.ok, error = %outcome.error, "lifecycle command finished");
        outcome
    }

    /// Fire-and-forget variant: the outcome is posted to the completion
    /// channel. Must be called from within a tokio runtime.
    pub fn submit(&self, command: LifecycleCommand, pid: u32) {
        let runner = self.clone();
        tokio::spawn(async move {
            let outcome = runner.execute(command, pid).await;
            // Receiver gone means the app is shutting down.
            let _ = runner.completions.send(outcome);
        });
    }
}
