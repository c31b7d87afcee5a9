// ABOUTME: Error types for the container replacement protocol with SNAFU context.
// ABOUTME: One variant per failing step, classified by UpdateErrorKind.

use snafu::Snafu;

use crate::auth::AuthError;
use crate::runtime::{ContainerError, ExecError, ImageError, NetworkError};
use crate::types::{ContainerId, ExecId, ImageId, ParseImageRefError};

/// Failure of one step while inspecting, checking, stopping, or recreating a container.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum UpdateError {
    #[snafu(display("failed to list containers: {source}"))]
    ListContainers { source: ContainerError },

    #[snafu(display("failed to inspect container {id}: {source}"))]
    InspectContainer {
        id: ContainerId,
        source: ContainerError,
    },

    #[snafu(display("failed to inspect image {image}: {source}"))]
    InspectImage { image: String, source: ImageError },

    #[snafu(display("container {name} has an invalid image reference: {source}"))]
    InvalidImage {
        name: String,
        source: ParseImageRefError,
    },

    #[snafu(display("failed to resolve credentials for {image}: {source}"))]
    Credentials { image: String, source: AuthError },

    #[snafu(display("failed to pull {image}: {source}"))]
    PullImage { image: String, source: ImageError },

    #[snafu(display("failed to signal container {name} ({id}): {source}"))]
    KillContainer {
        name: String,
        id: ContainerId,
        source: ContainerError,
    },

    #[snafu(display("failed waiting on container {name} ({id}): {source}"))]
    WaitContainer {
        name: String,
        id: ContainerId,
        source: ContainerError,
    },

    #[snafu(display("failed to remove container {name} ({id}): {source}"))]
    RemoveContainer {
        name: String,
        id: ContainerId,
        source: ContainerError,
    },

    #[snafu(display("container {name} ({id}) could not be removed"))]
    NotRemoved { name: String, id: ContainerId },

    #[snafu(display("failed to create container {name}: {source}"))]
    CreateContainer {
        name: String,
        source: ContainerError,
    },

    #[snafu(display("failed to disconnect {name} from network {network}: {source}"))]
    DisconnectNetwork {
        name: String,
        network: String,
        source: NetworkError,
    },

    #[snafu(display("failed to connect {name} to network {network}: {source}"))]
    ConnectNetwork {
        name: String,
        network: String,
        source: NetworkError,
    },

    #[snafu(display("failed to start container {name} ({id}): {source}"))]
    StartContainer {
        name: String,
        id: ContainerId,
        source: ContainerError,
    },

    #[snafu(display("failed to rename container {name} ({id}) to {new_name}: {source}"))]
    RenameContainer {
        name: String,
        id: ContainerId,
        new_name: String,
        source: ContainerError,
    },

    #[snafu(display("failed to remove image {image}: {source}"))]
    RemoveImage { image: ImageId, source: ImageError },

    #[snafu(display("failed to create exec in container {id}: {source}"))]
    CreateExec { id: ContainerId, source: ExecError },

    #[snafu(display("failed to start exec {exec}: {source}"))]
    StartExec { exec: ExecId, source: ExecError },

    #[snafu(display("failed to inspect exec {exec}: {source}"))]
    InspectExec { exec: ExecId, source: ExecError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateErrorKind {
    /// The inspected container or image does not exist.
    NotFound,
    /// Any other daemon failure. Never retried.
    Transport,
    /// Removal was requested but the container is still present.
    ConfirmationFailure,
    /// Registry credentials could not be resolved.
    Credentials,
    /// The container's image name is not a valid reference.
    InvalidReference,
}

impl UpdateError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> UpdateErrorKind {
        match self {
            UpdateError::InspectContainer { source, .. } if source.is_not_found() => {
                UpdateErrorKind::NotFound
            }
            UpdateError::InspectImage { source, .. } if source.is_not_found() => {
                UpdateErrorKind::NotFound
            }
            UpdateError::NotRemoved { .. } => UpdateErrorKind::ConfirmationFailure,
            UpdateError::Credentials { .. } => UpdateErrorKind::Credentials,
            UpdateError::InvalidImage { .. } => UpdateErrorKind::InvalidReference,
            _ => UpdateErrorKind::Transport,
        }
    }
}
