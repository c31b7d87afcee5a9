// ABOUTME: Configuration types and parsing for reimage.yml.
// ABOUTME: Handles YAML parsing, duration fields, and registry credential lookup.

mod env_value;
mod hooks;
mod registry;
mod stop;

pub use env_value::EnvValue;
pub use hooks::HooksConfig;
pub use registry::RegistryCredentials;
pub use stop::{DEFAULT_STOP_SIGNAL, StopConfig};

use crate::error::{Error, Result};
use crate::runtime::{RuntimeConfig, RuntimeType};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "reimage.yml";
pub const CONFIG_FILENAME_ALT: &str = "reimage.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".reimage/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Explicit runtime; auto-detected when absent.
    #[serde(default)]
    pub runtime: Option<RuntimeType>,

    /// Explicit daemon socket path.
    #[serde(default)]
    pub socket: Option<String>,

    /// Pull images before comparing IDs.
    #[serde(default = "default_pull")]
    pub pull: bool,

    /// Remove the old image after a successful replacement.
    #[serde(default)]
    pub cleanup: bool,

    /// Only consider containers labelled `reimage.enable=true`.
    #[serde(default)]
    pub label_enable: bool,

    /// Container names to consider; empty means all.
    #[serde(default)]
    pub containers: Vec<String>,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default)]
    pub stop: StopConfig,

    #[serde(default)]
    pub hooks: HooksConfig,

    /// Credentials by registry host.
    #[serde(default)]
    pub registries: HashMap<String, RegistryCredentials>,
}

fn default_pull() -> bool {
    true
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

impl Default for Config {
    fn default() -> Self {
        Config {
            runtime: None,
            socket: None,
            pull: default_pull(),
            cleanup: false,
            label_enable: false,
            containers: Vec::new(),
            poll_interval: default_poll_interval(),
            stop: StopConfig::default(),
            hooks: HooksConfig::default(),
            registries: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).map_err(Error::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like `discover`, but falls back to defaults when no file exists.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.stop.signal.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "stop.signal cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Runtime selection for detection.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            runtime: self.runtime,
            socket: self.socket.clone(),
        }
    }

    /// Credentials configured for a registry host, if any.
    pub fn registry(&self, host: &str) -> Option<&RegistryCredentials> {
        self.registries.get(host)
    }
}
