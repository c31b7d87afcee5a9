// ABOUTME: Runs the check-and-replace flow over every selected container.
// ABOUTME: Failures are recorded per container and never stop the session.

use chrono::Utc;
use std::time::Duration;

use super::UpdateClient;
use super::error::UpdateError;
use super::replacement::{Checked, Replacement};
use crate::config::Config;
use crate::container::{Container, ContainerFilter};
use crate::diagnostics::{Diagnostics, Warning};
use crate::hooks::{HookPoint, HookRunner};
use crate::report::{ContainerReport, SessionReport, UpdateState};
use crate::runtime::FullRuntime;
use crate::types::ImageId;

/// Whether a session only reports or also replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Check,
    Update,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub mode: SessionMode,
    /// Bound on each shutdown wait.
    pub stop_timeout: Duration,
    /// Remove old images once their containers are replaced.
    pub cleanup: bool,
    pub hooks: HookRunner,
}

impl SessionOptions {
    pub fn from_config(config: &Config, mode: SessionMode) -> Self {
        Self {
            mode,
            stop_timeout: config.stop.timeout,
            cleanup: config.cleanup,
            hooks: HookRunner::from_config(&config.hooks),
        }
    }
}

/// Check every container accepted by `filter` and, in update mode, replace
/// the stale ones one after another.
///
/// Only failing to list containers is an error; everything else lands in the
/// report.
pub async fn run_session<R: FullRuntime>(
    client: &UpdateClient<R>,
    filter: &ContainerFilter,
    options: &SessionOptions,
) -> Result<SessionReport, UpdateError> {
    let started = Utc::now();
    let containers = client.list_containers(filter).await?;
    tracing::info!(count = containers.len(), mode = ?options.mode, "starting session");

    let mut diagnostics = Diagnostics::default();
    let mut reports = Vec::with_capacity(containers.len());
    let mut replaced_images: Vec<ImageId> = Vec::new();

    for container in containers {
        let report = process(client, container, options, &mut diagnostics).await;
        if report.state == UpdateState::Updated && !replaced_images.contains(&report.current_image)
        {
            replaced_images.push(report.current_image.clone());
        }
        reports.push(report);
    }

    if options.cleanup {
        for image in &replaced_images {
            if let Err(e) = client.remove_image(image).await {
                diagnostics.warn(Warning::image_cleanup(format!(
                    "could not remove old image {}: {}",
                    image.short(),
                    e
                )));
            }
        }
    }

    Ok(SessionReport {
        started,
        finished: Utc::now(),
        containers: reports,
        warnings: diagnostics.into_warnings(),
    })
}

async fn process<R: FullRuntime>(
    client: &UpdateClient<R>,
    container: Container,
    options: &SessionOptions,
    diagnostics: &mut Diagnostics,
) -> ContainerReport {
    let mut report = ContainerReport::scanned(&container);

    let stale = match Replacement::new(container).check(client).await {
        Ok(Checked::Stale(stale)) => stale,
        Ok(Checked::Fresh(fresh)) => {
            report.latest_image = Some(fresh.latest_image().clone());
            report.state = UpdateState::Fresh;
            return report;
        }
        Err(e) => {
            tracing::warn!(container = %report.name, "unable to check for a new image: {}", e);
            report.fail(e);
            return report;
        }
    };
    report.latest_image = Some(stale.latest_image().clone());

    if options.mode == SessionMode::Check {
        report.state = UpdateState::Stale;
        return report;
    }
    if stale.container().is_monitor_only() {
        tracing::info!(container = %report.name, "monitor-only container, not updating");
        report.state = UpdateState::Skipped;
        return report;
    }

    options
        .hooks
        .run(client, HookPoint::PreUpdate, stale.container(), diagnostics)
        .await;

    let recreated = match stale.remove(client, options.stop_timeout).await {
        Ok(removed) => removed.recreate(client).await,
        Err(e) => Err(e),
    };
    let recreated = match recreated {
        Ok(recreated) => recreated,
        Err(e) => {
            tracing::error!(container = %report.name, "update failed: {}", e);
            report.fail(e);
            return report;
        }
    };

    tracing::info!(
        container = %report.name,
        old_image = %recreated.old_image().short(),
        new_image = %recreated.latest_image().short(),
        id = %recreated.new_container().short(),
        "container updated"
    );
    report.new_container = Some(recreated.new_container().clone());
    report.state = UpdateState::Updated;

    if options.hooks.is_enabled() {
        match client.get_container(recreated.new_container()).await {
            Ok(replacement) => {
                options
                    .hooks
                    .run(client, HookPoint::PostUpdate, &replacement, diagnostics)
                    .await;
            }
            Err(e) => diagnostics.warn(Warning::hook_failed(format!(
                "could not inspect {} for its post-update hook: {}",
                report.name, e
            ))),
        }
    }

    report
}
