// ABOUTME: Registry credential resolution for image pulls.
// ABOUTME: CredentialSource trait plus anonymous and config-backed implementations.

use crate::config::{Config, RegistryCredentials};
use crate::runtime::RegistryAuth;
use crate::types::ImageRef;
use std::collections::HashMap;

/// Errors while resolving registry credentials.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("credentials for {registry} could not be resolved: {reason}")]
    Unresolved { registry: String, reason: String },
}

/// Looks up the credentials to pull an image with.
///
/// `Ok(None)` means pull anonymously. An error must never be treated as
/// anonymous access.
pub trait CredentialSource: Send + Sync {
    fn credentials_for(&self, image: &ImageRef) -> Result<Option<RegistryAuth>, AuthError>;
}

/// Always pulls anonymously.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialSource for Anonymous {
    fn credentials_for(&self, _image: &ImageRef) -> Result<Option<RegistryAuth>, AuthError> {
        Ok(None)
    }
}

/// Credentials from the `registries` section of the config file.
///
/// Environment references are resolved at lookup time so rotated secrets
/// are picked up without a restart.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredCredentials {
    registries: HashMap<String, RegistryCredentials>,
}

impl ConfiguredCredentials {
    pub fn new(registries: HashMap<String, RegistryCredentials>) -> Self {
        Self { registries }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.registries.clone())
    }
}

impl CredentialSource for ConfiguredCredentials {
    fn credentials_for(&self, image: &ImageRef) -> Result<Option<RegistryAuth>, AuthError> {
        let registry = image.registry_or_default();
        let Some(creds) = self.registries.get(registry) else {
            tracing::debug!(image = %image, registry, "no credentials configured");
            return Ok(None);
        };

        creds
            .resolve(registry)
            .map(Some)
            .map_err(|e| AuthError::Unresolved {
                registry: registry.to_string(),
                reason: e.to_string(),
            })
    }
}
