// ABOUTME: Decides whether a newer image is available for a container.
// ABOUTME: Optionally pulls with resolved credentials, then compares image IDs.

use snafu::ResultExt;

use super::error::{
    CredentialsSnafu, InspectImageSnafu, InvalidImageSnafu, PullImageSnafu, UpdateError,
};
use crate::auth::CredentialSource;
use crate::container::Container;
use crate::runtime::ImageOps;
use crate::types::ImageId;

/// Image IDs compared by a staleness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalenessCheck {
    /// Image the container was started from.
    pub current: ImageId,
    /// Image the container's reference resolves to now.
    pub latest: ImageId,
}

impl StalenessCheck {
    pub fn is_stale(&self) -> bool {
        self.current != self.latest
    }
}

/// Pull (when `pull` is set) and inspect the container's image reference.
///
/// Credential resolution failures are errors, never treated as "up to date".
pub async fn check_staleness<R: ImageOps + ?Sized>(
    runtime: &R,
    credentials: &dyn CredentialSource,
    container: &Container,
    pull: bool,
) -> Result<StalenessCheck, UpdateError> {
    let image_name = container.image_name();

    if pull {
        let reference = container.image_ref().context(InvalidImageSnafu {
            name: container.name(),
        })?;
        let auth = credentials
            .credentials_for(&reference)
            .context(CredentialsSnafu {
                image: image_name.as_str(),
            })?;
        if auth.is_none() {
            tracing::debug!(image = %image_name, "no credentials found, pulling anonymously");
        }

        tracing::debug!(container = %container.name(), image = %image_name, "pulling image");
        runtime
            .pull_image(&reference, auth.as_ref())
            .await
            .context(PullImageSnafu {
                image: image_name.as_str(),
            })?;
    }

    let fresh = runtime
        .inspect_image(&image_name)
        .await
        .context(InspectImageSnafu {
            image: image_name.as_str(),
        })?;

    let check = StalenessCheck {
        current: container.image_id().clone(),
        latest: fresh.id,
    };

    if check.is_stale() {
        tracing::info!(
            container = %container.name(),
            image = %image_name,
            latest = %check.latest.short(),
            "found new image"
        );
    } else {
        tracing::debug!(container = %container.name(), "no new image found");
    }

    Ok(check)
}

/// `true` when the container's image reference now resolves to a different image.
pub async fn is_stale<R: ImageOps + ?Sized>(
    runtime: &R,
    credentials: &dyn CredentialSource,
    container: &Container,
    pull: bool,
) -> Result<bool, UpdateError> {
    check_staleness(runtime, credentials, container, pull)
        .await
        .map(|check| check.is_stale())
}
