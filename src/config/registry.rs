// ABOUTME: Registry credential entries keyed by registry host.
// ABOUTME: Passwords may reference environment variables through EnvValue.

use super::EnvValue;
use crate::error::Result;
use crate::runtime::RegistryAuth;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryCredentials {
    pub username: EnvValue,
    pub password: EnvValue,
}

impl RegistryCredentials {
    /// Resolve both values into daemon credentials for `server`.
    pub fn resolve(&self, server: &str) -> Result<RegistryAuth> {
        Ok(RegistryAuth {
            username: self.username.resolve()?,
            password: self.password.resolve()?,
            server: Some(server.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn resolves_password_from_environment() {
        let creds = RegistryCredentials {
            username: EnvValue::Literal("bot".to_string()),
            password: EnvValue::FromEnv {
                var: "REIMAGE_TEST_REGISTRY_TOKEN".to_string(),
                default: None,
            },
        };

        temp_env::with_var("REIMAGE_TEST_REGISTRY_TOKEN", Some("s3cret"), || {
            let auth = creds.resolve("ghcr.io").unwrap();
            assert_eq!(auth.username, "bot");
            assert_eq!(auth.password, "s3cret");
            assert_eq!(auth.server.as_deref(), Some("ghcr.io"));
        });
    }

    #[test]
    fn missing_variable_is_an_error() {
        let creds = RegistryCredentials {
            username: EnvValue::Literal("bot".to_string()),
            password: EnvValue::FromEnv {
                var: "REIMAGE_TEST_MISSING_TOKEN".to_string(),
                default: None,
            },
        };

        temp_env::with_var_unset("REIMAGE_TEST_MISSING_TOKEN", || {
            let err = creds.resolve("ghcr.io").unwrap_err();
            assert!(matches!(err, Error::MissingEnvVar(v) if v == "REIMAGE_TEST_MISSING_TOKEN"));
        });
    }
}
