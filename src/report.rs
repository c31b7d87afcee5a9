// ABOUTME: Per-container results and the session report built from them.
// ABOUTME: Serializable for JSON output; grouped by final state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::container::Container;
use crate::diagnostics::Warning;
use crate::types::{ContainerId, ImageId};

/// Final state of one container in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateState {
    /// Listed, not yet checked.
    Scanned,
    /// A newer image exists and the container was not replaced.
    Stale,
    /// Already running the latest image.
    Fresh,
    /// Replaced with a container on the new image.
    Updated,
    /// Stale but deliberately left alone.
    Skipped,
    /// A step failed; see `error`.
    Failed,
}

/// Outcome for one container.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerReport {
    pub id: ContainerId,
    pub name: String,
    pub image_name: String,
    pub current_image: ImageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<ImageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_container: Option<ContainerId>,
    pub state: UpdateState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContainerReport {
    pub fn scanned(container: &Container) -> Self {
        Self {
            id: container.id().clone(),
            name: container.name().to_string(),
            image_name: container.image_name(),
            current_image: container.image_id().clone(),
            latest_image: None,
            new_container: None,
            state: UpdateState::Scanned,
            error: None,
        }
    }

    pub fn fail(&mut self, error: impl std::fmt::Display) {
        self.state = UpdateState::Failed;
        self.error = Some(error.to_string());
    }
}

/// Everything one session did.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub containers: Vec<ContainerReport>,
    pub warnings: Vec<Warning>,
}

impl SessionReport {
    fn in_state(&self, state: UpdateState) -> Vec<&ContainerReport> {
        self.containers.iter().filter(|c| c.state == state).collect()
    }

    /// Every container the session looked at.
    pub fn scanned(&self) -> &[ContainerReport] {
        &self.containers
    }

    pub fn updated(&self) -> Vec<&ContainerReport> {
        self.in_state(UpdateState::Updated)
    }

    pub fn failed(&self) -> Vec<&ContainerReport> {
        self.in_state(UpdateState::Failed)
    }

    pub fn skipped(&self) -> Vec<&ContainerReport> {
        self.in_state(UpdateState::Skipped)
    }

    pub fn stale(&self) -> Vec<&ContainerReport> {
        self.in_state(UpdateState::Stale)
    }

    pub fn fresh(&self) -> Vec<&ContainerReport> {
        self.in_state(UpdateState::Fresh)
    }

    pub fn has_failures(&self) -> bool {
        self.containers
            .iter()
            .any(|c| c.state == UpdateState::Failed)
    }
}
