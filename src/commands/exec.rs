// ABOUTME: Exec command implementation.
// ABOUTME: Runs a shell command inside a container and reports its output and exit code.

use super::runtime_connection::connect_to_runtime;
use reimage::config::Config;
use reimage::error::{Error, Result};
use reimage::output::Output;
use reimage::types::ContainerId;
use reimage::update::{ExecOutcome, UpdateClient, UpdateOptions};
use std::time::Duration;

/// Execute a command in a container, addressed by name or ID.
pub async fn exec_command(
    config: Config,
    container: &str,
    command: &str,
    timeout: Duration,
    output: Output,
) -> Result<()> {
    let runtime = connect_to_runtime(&config, &output).await?;
    if !runtime.runtime_type().supports_attached_exec() {
        output.hint(&format!(
            "{} exec output is not captured; only the exit code is reported",
            runtime.runtime_type()
        ));
    }
    let client = UpdateClient::new(runtime, UpdateOptions::from_config(&config));

    // The daemon resolves names as well as IDs on inspect.
    let target = client.get_container(&ContainerId::from(container)).await?;

    output.progress(&format!("Running in {}...", target.name()));
    let outcome = client
        .execute_command(target.id(), command, timeout)
        .await?;
    output.exec_outcome(&outcome);

    match outcome {
        ExecOutcome::Failed { exit_code, .. } => Err(Error::CommandFailed(exit_code)),
        _ => Ok(()),
    }
}
