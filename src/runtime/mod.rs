// ABOUTME: Container runtime access for Docker and Podman.
// ABOUTME: Capability traits, the bollard-backed implementation, and socket detection.

mod bollard;
mod detection;
mod error;
pub mod traits;
mod types;

pub use self::bollard::BollardRuntime;
pub use detection::{DetectionError, detect_local, resolve_runtime};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use traits::RuntimeInfo as RuntimeInfoTrait;
pub use traits::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerInfo, ContainerOps,
    ContainerState, ContainerSummary, EndpointConfig, ExecConfig, ExecError, ExecInfo, ExecOps,
    ExecOutputStream, ExecStart, FullRuntime, HostConfig, ImageDefaults, ImageDetails,
    ImageError, ImageOps, LogConfig, MountKind, NetworkError, NetworkMode, NetworkOps,
    PortMapping, Protocol, RegistryAuth, RemoveOptions, ResourceLimits, RestartPolicyConfig,
    RunConfig, RuntimeInfoError, RuntimeMetadata, VolumeMount,
};
pub use types::{DOCKER_SOCKET, ROOTFUL_PODMAN_SOCKET, RuntimeConfig, RuntimeInfo, RuntimeType};
