// ABOUTME: One container's replacement, parameterized by state marker.
// ABOUTME: Transitions consume self so recreate is unreachable before removal is confirmed.

use std::time::Duration;

use super::UpdateClient;
use super::error::UpdateError;
use super::state::{Fresh, Recreated, Removed, Snapshotted, Stale};
use crate::container::Container;
use crate::runtime::FullRuntime;
use crate::types::{ContainerId, ImageId};

/// A replacement in progress, parameterized by its current state.
#[derive(Debug)]
pub struct Replacement<S> {
    container: Container,
    state: S,
}

/// Result of checking a snapshot for a newer image.
#[derive(Debug)]
pub enum Checked {
    Stale(Replacement<Stale>),
    Fresh(Replacement<Fresh>),
}

impl<S> Replacement<S> {
    /// The snapshot of the container being replaced.
    pub fn container(&self) -> &Container {
        &self.container
    }

    fn transition<T>(self, state: T) -> Replacement<T> {
        Replacement {
            container: self.container,
            state,
        }
    }
}

impl Replacement<Snapshotted> {
    pub fn new(container: Container) -> Self {
        Replacement {
            container,
            state: Snapshotted,
        }
    }

    /// Pull (if enabled) and compare image IDs.
    pub async fn check<R: FullRuntime>(
        self,
        client: &UpdateClient<R>,
    ) -> Result<Checked, UpdateError> {
        let check = client.check_staleness(&self.container).await?;
        let latest = check.latest.clone();
        Ok(if check.is_stale() {
            Checked::Stale(self.transition(Stale { latest }))
        } else {
            Checked::Fresh(self.transition(Fresh { latest }))
        })
    }
}

impl Replacement<Fresh> {
    pub fn latest_image(&self) -> &ImageId {
        &self.state.latest
    }
}

impl Replacement<Stale> {
    pub fn latest_image(&self) -> &ImageId {
        &self.state.latest
    }

    /// Stop and remove the old container, confirming it is gone.
    pub async fn remove<R: FullRuntime>(
        self,
        client: &UpdateClient<R>,
        timeout: Duration,
    ) -> Result<Replacement<Removed>, UpdateError> {
        client.stop_container(&self.container, timeout).await?;
        let latest = self.state.latest.clone();
        Ok(self.transition(Removed { latest }))
    }
}

impl Replacement<Removed> {
    /// Create and start the replacement under the original name.
    pub async fn recreate<R: FullRuntime>(
        self,
        client: &UpdateClient<R>,
    ) -> Result<Replacement<Recreated>, UpdateError> {
        let new_container = client.start_container(&self.container).await?;
        let latest = self.state.latest.clone();
        Ok(self.transition(Recreated {
            latest,
            new_container,
        }))
    }
}

impl Replacement<Recreated> {
    pub fn new_container(&self) -> &ContainerId {
        &self.state.new_container
    }

    pub fn latest_image(&self) -> &ImageId {
        &self.state.latest
    }

    /// ID of the image the replaced container ran.
    pub fn old_image(&self) -> &ImageId {
        self.container.image_id()
    }
}
