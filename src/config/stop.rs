// ABOUTME: Container shutdown configuration.
// ABOUTME: Timeout for each shutdown wait and the fallback stop signal.

use serde::Deserialize;
use std::time::Duration;

/// Default signal when neither a label nor the container names one.
pub const DEFAULT_STOP_SIGNAL: &str = "SIGTERM";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StopConfig {
    /// Bound on waiting for exit, and separately on waiting for removal.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_signal")]
    pub signal: String,
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_signal() -> String {
    DEFAULT_STOP_SIGNAL.to_string()
}

impl Default for StopConfig {
    fn default() -> Self {
        StopConfig {
            timeout: default_timeout(),
            signal: default_signal(),
        }
    }
}
