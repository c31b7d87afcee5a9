// ABOUTME: Runs a shell command inside a container and reports how it ended.
// ABOUTME: A nonzero exit is an outcome, not an error; only failing to run is an error.

use futures::StreamExt;
use snafu::ResultExt;

use super::error::{CreateExecSnafu, InspectExecSnafu, StartExecSnafu, UpdateError};
use super::poll::{PollOutcome, PollSchedule, poll_until};
use crate::runtime::{ExecConfig, ExecError, ExecInfo, ExecOps, ExecStart};
use crate::types::{ContainerId, ExecId};

/// How a command run through `execute_command` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Exited with status 0.
    Succeeded { output: String },
    /// Ran and exited with a nonzero status.
    Failed { exit_code: i64, output: String },
    /// Still running when the wait window closed.
    Unfinished { output: String },
}

impl ExecOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecOutcome::Succeeded { .. })
    }

    pub fn output(&self) -> &str {
        match self {
            ExecOutcome::Succeeded { output }
            | ExecOutcome::Failed { output, .. }
            | ExecOutcome::Unfinished { output } => output,
        }
    }

    pub fn exit_code(&self) -> Option<i64> {
        match self {
            ExecOutcome::Succeeded { .. } => Some(0),
            ExecOutcome::Failed { exit_code, .. } => Some(*exit_code),
            ExecOutcome::Unfinished { .. } => None,
        }
    }
}

/// Run `sh -c <command>` in `container` with a TTY and collect its output.
///
/// When attaching fails the command is started detached instead and its
/// completion is polled; output is then empty. `schedule` bounds how long
/// completion is awaited after the output stream ends.
pub async fn execute_command<R: ExecOps + ?Sized>(
    runtime: &R,
    container: &ContainerId,
    command: &str,
    schedule: PollSchedule,
) -> Result<ExecOutcome, UpdateError> {
    tracing::debug!(id = %container.short(), command, "executing command");

    let exec = runtime
        .exec_create(container, &ExecConfig::shell(command))
        .await
        .context(CreateExecSnafu {
            id: container.clone(),
        })?;

    let raw = match runtime.exec_start(&exec, false).await {
        Ok(ExecStart::Attached(mut stream)) => {
            let mut raw = Vec::new();
            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(bytes) => raw.extend_from_slice(&bytes),
                    Err(e) => {
                        tracing::error!(exec = %exec, "failed to read command output: {}", e);
                        break;
                    }
                }
            }
            raw
        }
        Ok(ExecStart::Detached) => Vec::new(),
        Err(ExecError::AttachFailed(reason)) => {
            tracing::error!(exec = %exec, "failed to attach to command output: {}", reason);
            runtime
                .exec_start(&exec, true)
                .await
                .context(StartExecSnafu { exec: exec.clone() })?;
            Vec::new()
        }
        Err(e) => return Err(e).context(StartExecSnafu { exec: exec.clone() }),
    };
    let output = String::from_utf8_lossy(&raw).trim().to_string();

    let finished = wait_for_exit(runtime, &exec, schedule)
        .await
        .context(InspectExecSnafu { exec: exec.clone() })?;

    let outcome = match finished {
        PollOutcome::Satisfied(info) => match info.exit_code.unwrap_or(0) {
            0 => ExecOutcome::Succeeded { output },
            exit_code => ExecOutcome::Failed { exit_code, output },
        },
        PollOutcome::TimedOut => ExecOutcome::Unfinished { output },
    };

    match &outcome {
        ExecOutcome::Succeeded { output } if !output.is_empty() => {
            tracing::info!(id = %container.short(), "command output:\n{}", output);
        }
        ExecOutcome::Succeeded { .. } => {}
        ExecOutcome::Failed { exit_code, output } => {
            tracing::error!(id = %container.short(), exit_code, "command exited with code {}", exit_code);
            if !output.is_empty() {
                tracing::error!(id = %container.short(), "{}", output);
            }
        }
        ExecOutcome::Unfinished { .. } => {
            tracing::warn!(
                id = %container.short(),
                timeout = ?schedule.timeout,
                "command still running after timeout"
            );
        }
    }

    Ok(outcome)
}

async fn wait_for_exit<R: ExecOps + ?Sized>(
    runtime: &R,
    exec: &ExecId,
    schedule: PollSchedule,
) -> Result<PollOutcome<ExecInfo>, ExecError> {
    poll_until(schedule, || async move {
        let info = runtime.exec_inspect(exec).await?;
        Ok(if info.running { None } else { Some(info) })
    })
    .await
}
