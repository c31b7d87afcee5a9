// ABOUTME: Check and update command implementations.
// ABOUTME: Build a client and filter from config, run a session, print the report.

use super::runtime_connection::connect_to_runtime;
use reimage::auth::ConfiguredCredentials;
use reimage::config::Config;
use reimage::container::build_filter;
use reimage::error::{Error, Result};
use reimage::output::Output;
use reimage::update::{SessionMode, SessionOptions, UpdateClient, UpdateOptions, run_session};

/// Report which containers have a newer image.
pub async fn check(config: Config, output: Output) -> Result<()> {
    run(config, SessionMode::Check, output).await
}

/// Replace containers whose image has changed.
pub async fn update(config: Config, output: Output) -> Result<()> {
    run(config, SessionMode::Update, output).await
}

async fn run(config: Config, mode: SessionMode, mut output: Output) -> Result<()> {
    output.start_timer();

    let runtime = connect_to_runtime(&config, &output).await?;
    let client = UpdateClient::new(runtime, UpdateOptions::from_config(&config))
        .with_credentials(ConfiguredCredentials::from_config(&config));

    let filter = build_filter(config.containers.clone(), config.label_enable);
    let options = SessionOptions::from_config(&config, mode);

    let report = run_session(&client, &filter, &options).await?;

    for warning in &report.warnings {
        output.warning(&warning.message);
    }
    output.report(&report);

    if report.has_failures() {
        return Err(Error::SessionFailed {
            failed: report.failed().len(),
            scanned: report.scanned().len(),
        });
    }

    match mode {
        SessionMode::Check => output.success("Check complete"),
        SessionMode::Update => output.success("Update complete"),
    }
    Ok(())
}
