// ABOUTME: Lifecycle hook configuration.
// ABOUTME: Toggles label-driven hooks and bounds how long each may run.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HooksConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

impl Default for HooksConfig {
    fn default() -> Self {
        HooksConfig {
            enabled: default_enabled(),
            timeout: default_timeout(),
        }
    }
}
