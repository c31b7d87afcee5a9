// ABOUTME: Shared types used across runtime trait definitions.
// ABOUTME: Container/image inspection snapshots, create requests, endpoints, exec types.

use crate::types::{ContainerId, ImageId};
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

/// Runtime configuration of a container: what the image runs and how.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    /// Image reference the container was created from.
    pub image: String,
    /// Environment entries in `KEY=value` form.
    pub env: Vec<String>,
    /// Command (overrides image CMD).
    pub cmd: Option<Vec<String>>,
    /// Entrypoint (overrides image ENTRYPOINT).
    pub entrypoint: Option<Vec<String>>,
    /// Labels.
    pub labels: HashMap<String, String>,
    /// Exposed ports in `port/proto` form.
    pub exposed_ports: Vec<String>,
    /// Anonymous volume targets.
    pub volumes: Vec<String>,
    /// Working directory.
    pub working_dir: Option<String>,
    /// User to run as.
    pub user: Option<String>,
    /// Hostname.
    pub hostname: Option<String>,
    /// Signal the daemon sends on `docker stop`.
    pub stop_signal: Option<String>,
    /// Stop timeout in seconds.
    pub stop_timeout: Option<i64>,
    /// Allocate a TTY.
    pub tty: bool,
    /// Keep stdin open.
    pub open_stdin: bool,
}

/// Defaults baked into an image; used to strip inherited values from a container config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageDefaults {
    pub env: Vec<String>,
    pub cmd: Option<Vec<String>>,
    pub entrypoint: Option<Vec<String>>,
    pub labels: HashMap<String, String>,
    pub exposed_ports: Vec<String>,
    pub volumes: Vec<String>,
    pub working_dir: Option<String>,
    pub user: Option<String>,
}

/// Host-side configuration of a container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostConfig {
    /// Restart policy.
    pub restart_policy: RestartPolicyConfig,
    /// Daemon removes the container once it exits.
    pub auto_remove: bool,
    /// Network mode (`bridge`, `host`, `none`, `container:<id>`, or a network name).
    pub network_mode: NetworkMode,
    /// Port bindings.
    pub port_bindings: Vec<PortMapping>,
    /// Bind specs in `source:target[:opts]` form.
    pub binds: Vec<String>,
    /// Structured mounts.
    pub mounts: Vec<VolumeMount>,
    /// Legacy links.
    pub links: Vec<String>,
    /// Extra `/etc/hosts` entries.
    pub extra_hosts: Vec<String>,
    /// DNS servers.
    pub dns: Vec<String>,
    /// Added kernel capabilities.
    pub cap_add: Vec<String>,
    /// Dropped kernel capabilities.
    pub cap_drop: Vec<String>,
    /// Privileged mode.
    pub privileged: bool,
    /// Containers whose volumes are mounted.
    pub volumes_from: Vec<String>,
    /// Resource limits.
    pub resources: ResourceLimits,
    /// Log driver and its options.
    pub log_config: Option<LogConfig>,
}

/// Container network mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NetworkMode {
    #[default]
    Default,
    Bridge,
    Host,
    None,
    Container(String),
    Named(String),
}

impl NetworkMode {
    pub fn parse(mode: &str) -> Self {
        match mode {
            "" | "default" => NetworkMode::Default,
            "bridge" => NetworkMode::Bridge,
            "host" => NetworkMode::Host,
            "none" => NetworkMode::None,
            other => match other.strip_prefix("container:") {
                Some(target) => NetworkMode::Container(target.to_string()),
                None => NetworkMode::Named(other.to_string()),
            },
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, NetworkMode::Host)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, NetworkMode::Container(_))
    }

    /// The string form the daemon expects, `None` for the daemon default.
    pub fn as_daemon_str(&self) -> Option<String> {
        match self {
            NetworkMode::Default => None,
            NetworkMode::Bridge => Some("bridge".to_string()),
            NetworkMode::Host => Some("host".to_string()),
            NetworkMode::None => Some("none".to_string()),
            NetworkMode::Container(target) => Some(format!("container:{}", target)),
            NetworkMode::Named(name) => Some(name.clone()),
        }
    }
}

/// Port mapping configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    /// Host port, `None` lets the daemon pick one.
    pub host_port: Option<u16>,
    /// Container port.
    pub container_port: u16,
    /// Protocol (tcp/udp).
    pub protocol: Protocol,
    /// Host IP to bind to.
    pub host_ip: Option<String>,
}

impl PortMapping {
    /// The `port/proto` key the daemon uses for exposed ports and bindings.
    pub fn port_key(&self) -> String {
        format!("{}/{}", self.container_port, self.protocol)
    }
}

/// Network protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Sctp => write!(f, "sctp"),
        }
    }
}

/// Mount configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    /// Mount kind.
    pub kind: MountKind,
    /// Source path or volume name.
    pub source: String,
    /// Target path in container.
    pub target: String,
    /// Read-only flag.
    pub read_only: bool,
}

/// Kind of a structured mount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MountKind {
    #[default]
    Bind,
    Volume,
    Tmpfs,
}

/// Restart policy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RestartPolicyConfig {
    /// Never restart.
    #[default]
    No,
    /// Always restart.
    Always,
    /// Restart unless explicitly stopped.
    UnlessStopped,
    /// Restart on failure with optional max retries.
    OnFailure { max_retries: Option<u32> },
}

/// Resource limits for a container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceLimits {
    /// Memory limit in bytes.
    pub memory: Option<i64>,
    /// CPU quota in units of 1e-9 CPUs.
    pub nano_cpus: Option<i64>,
}

/// Log driver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub driver: String,
    pub options: HashMap<String, String>,
}

/// Endpoint settings of a container on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointConfig {
    /// DNS aliases on this network.
    pub aliases: Vec<String>,
    /// Legacy links on this network.
    pub links: Vec<String>,
    /// Static IPv4 address requested at connect time.
    pub ipv4_address: Option<String>,
    /// Static IPv6 address requested at connect time.
    pub ipv6_address: Option<String>,
    /// Network ID (informational).
    pub network_id: String,
    /// Assigned IP address (informational).
    pub ip_address: String,
    /// Gateway (informational).
    pub gateway: String,
}

/// Configuration for creating a container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerConfig {
    /// Name for the container.
    pub name: String,
    /// Runtime configuration.
    pub run: RunConfig,
    /// Host configuration.
    pub host: HostConfig,
    /// Networks to attach at creation time. The daemon accepts at most one.
    pub networks: HashMap<String, EndpointConfig>,
}

/// Detailed information about a container at one instant.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    /// Container ID.
    pub id: ContainerId,
    /// Container name without the leading slash.
    pub name: String,
    /// ID of the image the container was started from.
    pub image_id: ImageId,
    /// Current state.
    pub state: ContainerState,
    /// Creation timestamp.
    pub created: String,
    /// Runtime configuration.
    pub config: RunConfig,
    /// Host configuration.
    pub host_config: HostConfig,
    /// Endpoint settings by network name.
    pub networks: HashMap<String, EndpointConfig>,
}

impl ContainerInfo {
    pub fn is_running(&self) -> bool {
        matches!(
            self.state,
            ContainerState::Running | ContainerState::Restarting
        )
    }
}

/// Container state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
}

/// Detailed information about an image.
#[derive(Debug, Clone)]
pub struct ImageDetails {
    /// Image ID.
    pub id: ImageId,
    /// Tags pointing at this image.
    pub repo_tags: Vec<String>,
    /// Registry digests of this image.
    pub repo_digests: Vec<String>,
    /// Defaults baked into the image.
    pub defaults: ImageDefaults,
}

/// Registry authentication credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryAuth {
    /// Username.
    pub username: String,
    /// Password or token.
    pub password: String,
    /// Registry server (e.g., "ghcr.io").
    pub server: Option<String>,
}

/// Runtime metadata.
#[derive(Debug, Clone)]
pub struct RuntimeMetadata {
    /// Runtime name (e.g., "docker", "podman").
    pub name: String,
    /// Runtime version.
    pub version: String,
    /// API version.
    pub api_version: String,
    /// Operating system.
    pub os: String,
    /// Architecture.
    pub arch: String,
}

/// Exec configuration for running commands in containers.
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Command and arguments to run.
    pub cmd: Vec<String>,
    /// Environment variables.
    pub env: Vec<String>,
    /// Working directory.
    pub working_dir: Option<String>,
    /// User to run as.
    pub user: Option<String>,
    /// Attach stdout.
    pub attach_stdout: bool,
    /// Attach stderr.
    pub attach_stderr: bool,
    /// Allocate a TTY.
    pub tty: bool,
}

impl ExecConfig {
    /// A shell command run through `sh -c` with a TTY and both output streams attached.
    pub fn shell(command: &str) -> Self {
        Self {
            cmd: vec!["sh".to_string(), "-c".to_string(), command.to_string()],
            tty: true,
            ..Default::default()
        }
    }
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            cmd: Vec::new(),
            env: Vec::new(),
            working_dir: None,
            user: None,
            attach_stdout: true,
            attach_stderr: true,
            tty: false,
        }
    }
}

/// Output stream of an attached exec session.
pub type ExecOutputStream = Pin<Box<dyn Stream<Item = Result<Bytes, super::ExecError>> + Send>>;

/// How an exec session was started.
pub enum ExecStart {
    /// Output is streamed until the command exits.
    Attached(ExecOutputStream),
    /// The command runs in the background; poll `exec_inspect` for completion.
    Detached,
}

impl std::fmt::Debug for ExecStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecStart::Attached(_) => f.write_str("Attached(..)"),
            ExecStart::Detached => f.write_str("Detached"),
        }
    }
}

/// Exec instance information.
#[derive(Debug, Clone)]
pub struct ExecInfo {
    /// Exec ID.
    pub id: crate::types::ExecId,
    /// Whether the exec is running.
    pub running: bool,
    /// Exit code (if finished).
    pub exit_code: Option<i64>,
}
