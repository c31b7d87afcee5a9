// ABOUTME: Ordered shutdown of a container: signal, bounded wait, remove, confirm removal.
// ABOUTME: Tolerates a container that is already stopped or already gone.

use snafu::ResultExt;

use super::error::{
    KillContainerSnafu, NotRemovedSnafu, RemoveContainerSnafu, UpdateError, WaitContainerSnafu,
};
use super::poll::{PollOutcome, PollSchedule, poll_until};
use crate::container::Container;
use crate::runtime::{ContainerError, ContainerOps, RemoveOptions};
use crate::types::ContainerId;

/// Stop and remove `container`, then wait until the daemon no longer knows it.
///
/// `schedule.timeout` bounds the wait for exit and, separately, the wait for
/// removal. A container still present after the second wait is a
/// confirmation failure.
pub async fn stop_container<R: ContainerOps + ?Sized>(
    runtime: &R,
    container: &Container,
    default_signal: &str,
    schedule: PollSchedule,
) -> Result<(), UpdateError> {
    let id = container.id();
    let name = container.name();
    let signal = container.stop_signal().unwrap_or(default_signal);

    tracing::info!(container = %name, id = %id.short(), signal, "stopping container");

    match runtime.kill_container(id, signal).await {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            tracing::debug!(container = %name, "container already removed");
            return confirm_removal(runtime, container, schedule).await;
        }
        Err(ContainerError::NotRunning(_)) => {
            tracing::debug!(container = %name, "container already stopped");
        }
        Err(e) => return Err(e).context(KillContainerSnafu { name, id: id.clone() }),
    }

    if let PollOutcome::TimedOut = wait_for_exit(runtime, id, schedule)
        .await
        .context(WaitContainerSnafu { name, id: id.clone() })?
    {
        tracing::warn!(
            container = %name,
            timeout = ?schedule.timeout,
            "container still running after timeout, removing anyway"
        );
    }

    if container.auto_remove() {
        tracing::debug!(container = %name, "auto-remove container, skipping explicit removal");
    } else {
        tracing::debug!(container = %name, id = %id.short(), "removing container");
        let options = RemoveOptions {
            force: true,
            remove_volumes: false,
        };
        match runtime.remove_container(id, options).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(container = %name, "container already removed");
            }
            Err(e) => return Err(e).context(RemoveContainerSnafu { name, id: id.clone() }),
        }
    }

    confirm_removal(runtime, container, schedule).await
}

async fn confirm_removal<R: ContainerOps + ?Sized>(
    runtime: &R,
    container: &Container,
    schedule: PollSchedule,
) -> Result<(), UpdateError> {
    let (name, id) = (container.name(), container.id());
    match wait_for_removal(runtime, id, schedule)
        .await
        .context(WaitContainerSnafu { name, id: id.clone() })?
    {
        PollOutcome::Satisfied(()) => Ok(()),
        PollOutcome::TimedOut => NotRemovedSnafu { name, id: id.clone() }.fail(),
    }
}

/// Satisfied once the container is not running or no longer exists.
async fn wait_for_exit<R: ContainerOps + ?Sized>(
    runtime: &R,
    id: &ContainerId,
    schedule: PollSchedule,
) -> Result<PollOutcome<()>, ContainerError> {
    poll_until(schedule, || async move {
        match runtime.inspect_container(id).await {
            Ok(info) if info.is_running() => Ok(None),
            Ok(_) => Ok(Some(())),
            Err(e) if e.is_not_found() => Ok(Some(())),
            Err(e) => Err(e),
        }
    })
    .await
}

/// Satisfied once inspecting the container reports it missing.
async fn wait_for_removal<R: ContainerOps + ?Sized>(
    runtime: &R,
    id: &ContainerId,
    schedule: PollSchedule,
) -> Result<PollOutcome<()>, ContainerError> {
    poll_until(schedule, || async move {
        match runtime.inspect_container(id).await {
            Ok(_) => Ok(None),
            Err(e) if e.is_not_found() => Ok(Some(())),
            Err(e) => Err(e),
        }
    })
    .await
}
