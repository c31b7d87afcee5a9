// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: Pull, inspect, and remove container images.

use super::shared_types::{ImageDetails, RegistryAuth};
use crate::types::{ImageId, ImageRef};
use async_trait::async_trait;

/// Image operations: pull, inspect, remove.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Pull an image from a registry.
    ///
    /// Implementations must consume the daemon's progress stream to the end;
    /// the daemon only finishes the pull once the stream has been read.
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError>;

    /// Inspect an image by reference or ID.
    async fn inspect_image(&self, reference: &str) -> Result<ImageDetails, ImageError>;

    /// Remove an image.
    async fn remove_image(&self, id: &ImageId, force: bool) -> Result<(), ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("authentication failed for registry: {0}")]
    AuthenticationFailed(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("image in use, cannot remove: {0}")]
    InUse(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

impl ImageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ImageError::NotFound(_))
    }
}
