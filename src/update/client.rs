// ABOUTME: UpdateClient ties a daemon, credentials, and options to the replacement steps.
// ABOUTME: Lists and snapshots containers, checks staleness, stops, recreates, and execs.

use snafu::ResultExt;
use std::time::Duration;

use super::error::{
    InspectContainerSnafu, InspectImageSnafu, ListContainersSnafu, RemoveImageSnafu,
    RenameContainerSnafu, UpdateError,
};
use super::exec::{self, ExecOutcome};
use super::poll::PollSchedule;
use super::staleness::{self, StalenessCheck};
use super::{recreate, shutdown};
use crate::auth::{Anonymous, CredentialSource};
use crate::config::{Config, DEFAULT_STOP_SIGNAL};
use crate::container::{Container, ContainerFilter};
use crate::runtime::{ContainerFilters, FullRuntime};
use crate::types::{ContainerId, ImageId};

/// Knobs for the replacement steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Pull images before comparing IDs.
    pub pull_images: bool,
    /// Signal used when neither a label nor the container names one.
    pub default_stop_signal: String,
    /// Interval between daemon polls while waiting.
    pub poll_interval: Duration,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            pull_images: true,
            default_stop_signal: DEFAULT_STOP_SIGNAL.to_string(),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl UpdateOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            pull_images: config.pull,
            default_stop_signal: config.stop.signal.clone(),
            poll_interval: config.poll_interval,
        }
    }

    pub fn schedule(&self, timeout: Duration) -> PollSchedule {
        PollSchedule::new(self.poll_interval, timeout)
    }
}

/// Entry point for inspecting and replacing containers on one daemon.
pub struct UpdateClient<R> {
    runtime: R,
    credentials: Box<dyn CredentialSource>,
    options: UpdateOptions,
}

impl<R: FullRuntime> UpdateClient<R> {
    /// Client that pulls anonymously.
    pub fn new(runtime: R, options: UpdateOptions) -> Self {
        Self {
            runtime,
            credentials: Box::new(Anonymous),
            options,
        }
    }

    pub fn with_credentials(mut self, credentials: impl CredentialSource + 'static) -> Self {
        self.credentials = Box::new(credentials);
        self
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn options(&self) -> &UpdateOptions {
        &self.options
    }

    /// Snapshot every running container accepted by `filter`.
    ///
    /// Containers that vanish between listing and inspection are skipped.
    pub async fn list_containers(
        &self,
        filter: &ContainerFilter,
    ) -> Result<Vec<Container>, UpdateError> {
        let summaries = self
            .runtime
            .list_containers(&ContainerFilters::default())
            .await
            .context(ListContainersSnafu)?;

        let mut containers = Vec::with_capacity(summaries.len());
        for summary in summaries {
            match self.get_container(&summary.id).await {
                Ok(container) if filter(&container) => containers.push(container),
                Ok(container) => {
                    tracing::debug!(container = %container.name(), "excluded by filter");
                }
                Err(UpdateError::InspectContainer { source, .. }) if source.is_not_found() => {
                    tracing::debug!(id = %summary.id.short(), "container disappeared while listing");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(containers)
    }

    /// Snapshot a container together with the image it was started from.
    pub async fn get_container(&self, id: &ContainerId) -> Result<Container, UpdateError> {
        let info = self
            .runtime
            .inspect_container(id)
            .await
            .context(InspectContainerSnafu { id: id.clone() })?;

        let image = self
            .runtime
            .inspect_image(info.image_id.as_str())
            .await
            .context(InspectImageSnafu {
                image: info.image_id.as_str(),
            })?;

        Ok(Container::new(info, image))
    }

    pub async fn check_staleness(
        &self,
        container: &Container,
    ) -> Result<StalenessCheck, UpdateError> {
        staleness::check_staleness(
            &self.runtime,
            self.credentials.as_ref(),
            container,
            self.options.pull_images,
        )
        .await
    }

    pub async fn is_container_stale(&self, container: &Container) -> Result<bool, UpdateError> {
        staleness::is_stale(
            &self.runtime,
            self.credentials.as_ref(),
            container,
            self.options.pull_images,
        )
        .await
    }

    /// Signal, wait, remove, and confirm removal; see `shutdown::stop_container`.
    pub async fn stop_container(
        &self,
        container: &Container,
        timeout: Duration,
    ) -> Result<(), UpdateError> {
        shutdown::stop_container(
            &self.runtime,
            container,
            &self.options.default_stop_signal,
            self.options.schedule(timeout),
        )
        .await
    }

    /// Recreate and start a replacement; see `recreate::start_container`.
    pub async fn start_container(&self, container: &Container) -> Result<ContainerId, UpdateError> {
        recreate::start_container(&self.runtime, container).await
    }

    pub async fn rename_container(
        &self,
        container: &Container,
        new_name: &str,
    ) -> Result<(), UpdateError> {
        tracing::debug!(
            container = %container.name(),
            id = %container.id().short(),
            new_name,
            "renaming container"
        );
        self.runtime
            .rename_container(container.id(), new_name)
            .await
            .context(RenameContainerSnafu {
                name: container.name(),
                id: container.id().clone(),
                new_name,
            })
    }

    /// Force-remove an image.
    pub async fn remove_image(&self, image: &ImageId) -> Result<(), UpdateError> {
        tracing::info!(image = %image.short(), "removing image");
        self.runtime
            .remove_image(image, true)
            .await
            .context(RemoveImageSnafu {
                image: image.clone(),
            })
    }

    /// Run a shell command in a container, waiting up to `timeout` for it to finish.
    pub async fn execute_command(
        &self,
        container: &ContainerId,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutcome, UpdateError> {
        exec::execute_command(
            &self.runtime,
            container,
            command,
            self.options.schedule(timeout),
        )
        .await
    }
}
