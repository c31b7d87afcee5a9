// ABOUTME: Which daemon flavour reimage talks to and where its socket lives.
// ABOUTME: RuntimeType, the resolved RuntimeInfo, and the config override.

use serde::{Deserialize, Serialize};

/// The container runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeType {
    Docker,
    Podman,
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeType::Docker => write!(f, "docker"),
            RuntimeType::Podman => write!(f, "podman"),
        }
    }
}

/// Rootful Podman API socket.
pub const ROOTFUL_PODMAN_SOCKET: &str = "/run/podman/podman.sock";
/// Docker daemon socket.
pub const DOCKER_SOCKET: &str = "/var/run/docker.sock";

impl RuntimeType {
    /// System-wide socket used when only the runtime type is configured.
    pub fn default_socket_path(&self) -> &'static str {
        match self {
            RuntimeType::Docker => DOCKER_SOCKET,
            RuntimeType::Podman => ROOTFUL_PODMAN_SOCKET,
        }
    }

    /// Whether exec output can be streamed; Podman's stream may never close.
    pub fn supports_attached_exec(&self) -> bool {
        matches!(self, RuntimeType::Docker)
    }
}

/// Detected runtime information.
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    /// The type of runtime detected.
    pub runtime_type: RuntimeType,
    /// Path to the runtime socket.
    pub socket_path: String,
}

/// Runtime selection from the `runtime` and `socket` config keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    /// Explicit runtime type (overrides auto-detection).
    pub runtime: Option<RuntimeType>,
    /// Explicit socket path (overrides default).
    pub socket: Option<String>,
}
