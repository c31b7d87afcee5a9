// ABOUTME: Bollard-based container runtime implementation.
// ABOUTME: Supports both Docker and Podman via Docker-compatible API.

use crate::runtime::traits::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerInfo, ContainerOps, ContainerState,
    ContainerSummary, EndpointConfig, ExecConfig, ExecError, ExecInfo, ExecOps, ExecStart,
    HostConfig, ImageDefaults, ImageDetails, ImageError, ImageOps, LogConfig, MountKind,
    NetworkError, NetworkMode, NetworkOps, PortMapping, Protocol, RegistryAuth, RemoveOptions,
    ResourceLimits, RestartPolicyConfig, RunConfig, RuntimeInfo, RuntimeInfoError,
    RuntimeMetadata, VolumeMount,
};
use crate::runtime::types::RuntimeType;
use crate::types::{ContainerId, ExecId, ImageId, ImageRef};
use async_trait::async_trait;
use bollard::Docker;
use bollard::exec::StartExecOptions;
use bollard::models::{
    ContainerCreateBody, EndpointIpamConfig, EndpointSettings, HostConfigLogConfig, Mount,
    MountTypeEnum, PortBinding, RestartPolicy, RestartPolicyNameEnum,
};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, InspectContainerOptions, KillContainerOptions,
    ListContainersOptions, RemoveContainerOptions, RemoveImageOptions,
};
use futures::StreamExt;
use std::collections::HashMap;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_pull_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 401 || *status_code == 403 =>
        {
            ImageError::AuthenticationFailed(format!("{}: {}", image_name, e))
        }
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        _ => ImageError::PullFailed(format!("{}: {}", image_name, e)),
    }
}

fn map_image_inspect_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        _ => ImageError::Runtime(format!("failed to inspect {}: {}", image_name, e)),
    }
}

fn map_image_remove_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 409 =>
        {
            ImageError::InUse(image_name.to_string())
        }
        _ => ImageError::Runtime(format!("failed to remove {}: {}", image_name, e)),
    }
}

fn map_container_create_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 400 => ContainerError::InvalidConfig(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_start_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::AlreadyRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_kill_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::NotRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_not_found_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_rename_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_network_connect_error(e: bollard::errors::Error) -> NetworkError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => NetworkError::NotFound(message.clone()),
        _ => NetworkError::Runtime(e.to_string()),
    }
}

fn map_network_disconnect_error(e: bollard::errors::Error) -> NetworkError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => NetworkError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 403 => NetworkError::NotConnected(message.clone()),
        _ => NetworkError::Runtime(e.to_string()),
    }
}

fn map_exec_create_error(e: bollard::errors::Error) -> ExecError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ExecError::ContainerNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ExecError::ContainerNotRunning(message.clone()),
        _ => ExecError::Runtime(e.to_string()),
    }
}

fn map_exec_start_error(e: bollard::errors::Error, attached: bool) -> ExecError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ExecError::ExecNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ExecError::ContainerNotRunning(message.clone()),
        // The daemon answered, so the start itself failed.
        bollard::errors::Error::DockerResponseServerError { .. } => {
            ExecError::Runtime(e.to_string())
        }
        _ if attached => ExecError::AttachFailed(e.to_string()),
        _ => ExecError::Runtime(e.to_string()),
    }
}

fn map_exec_not_found_error(e: bollard::errors::Error) -> ExecError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ExecError::ExecNotFound(message.clone()),
        _ => ExecError::Runtime(e.to_string()),
    }
}

// =============================================================================
// Model Conversion Helpers
// =============================================================================

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() { None } else { Some(items) }
}

fn non_empty_map(map: HashMap<String, String>) -> Option<HashMap<String, String>> {
    if map.is_empty() { None } else { Some(map) }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_port_key(key: &str) -> Option<(u16, Protocol)> {
    let (port, proto) = key.split_once('/').unwrap_or((key, "tcp"));
    let protocol = match proto {
        "udp" => Protocol::Udp,
        "sctp" => Protocol::Sctp,
        _ => Protocol::Tcp,
    };
    port.parse().ok().map(|p| (p, protocol))
}

fn restart_policy_from_model(policy: Option<RestartPolicy>) -> RestartPolicyConfig {
    let Some(policy) = policy else {
        return RestartPolicyConfig::No;
    };
    match policy.name {
        Some(RestartPolicyNameEnum::ALWAYS) => RestartPolicyConfig::Always,
        Some(RestartPolicyNameEnum::UNLESS_STOPPED) => RestartPolicyConfig::UnlessStopped,
        Some(RestartPolicyNameEnum::ON_FAILURE) => RestartPolicyConfig::OnFailure {
            max_retries: policy
                .maximum_retry_count
                .filter(|n| *n > 0)
                .map(|n| n as u32),
        },
        _ => RestartPolicyConfig::No,
    }
}

fn restart_policy_to_model(policy: &RestartPolicyConfig) -> RestartPolicy {
    RestartPolicy {
        name: Some(match policy {
            RestartPolicyConfig::No => RestartPolicyNameEnum::NO,
            RestartPolicyConfig::Always => RestartPolicyNameEnum::ALWAYS,
            RestartPolicyConfig::UnlessStopped => RestartPolicyNameEnum::UNLESS_STOPPED,
            RestartPolicyConfig::OnFailure { .. } => RestartPolicyNameEnum::ON_FAILURE,
        }),
        maximum_retry_count: match policy {
            RestartPolicyConfig::OnFailure { max_retries } => max_retries.map(|r| r as i64),
            _ => None,
        },
    }
}

fn run_config_from_model(config: Option<bollard::models::ContainerConfig>) -> RunConfig {
    let Some(config) = config else {
        return RunConfig::default();
    };
    RunConfig {
        image: config.image.unwrap_or_default(),
        env: config.env.unwrap_or_default(),
        cmd: config.cmd,
        entrypoint: config.entrypoint,
        labels: config.labels.unwrap_or_default(),
        exposed_ports: config.exposed_ports.unwrap_or_default(),
        volumes: config.volumes.unwrap_or_default(),
        working_dir: non_blank(config.working_dir),
        user: non_blank(config.user),
        hostname: non_blank(config.hostname),
        stop_signal: non_blank(config.stop_signal),
        stop_timeout: config.stop_timeout,
        tty: config.tty.unwrap_or(false),
        open_stdin: config.open_stdin.unwrap_or(false),
    }
}

fn host_config_from_model(host: Option<bollard::models::HostConfig>) -> HostConfig {
    let Some(host) = host else {
        return HostConfig::default();
    };

    let mut port_bindings = Vec::new();
    for (key, bindings) in host.port_bindings.unwrap_or_default() {
        let Some((container_port, protocol)) = parse_port_key(&key) else {
            continue;
        };
        let bindings = bindings.unwrap_or_default();
        if bindings.is_empty() {
            port_bindings.push(PortMapping {
                host_port: None,
                container_port,
                protocol,
                host_ip: None,
            });
        }
        for binding in bindings {
            port_bindings.push(PortMapping {
                host_port: binding.host_port.as_deref().and_then(|p| p.parse().ok()),
                container_port,
                protocol,
                host_ip: non_blank(binding.host_ip),
            });
        }
    }
    port_bindings.sort_by_key(|p| (p.container_port, p.host_port));

    let mounts = host
        .mounts
        .unwrap_or_default()
        .into_iter()
        .map(|m| VolumeMount {
            kind: match m.typ {
                Some(MountTypeEnum::VOLUME) => MountKind::Volume,
                Some(MountTypeEnum::TMPFS) => MountKind::Tmpfs,
                _ => MountKind::Bind,
            },
            source: m.source.unwrap_or_default(),
            target: m.target.unwrap_or_default(),
            read_only: m.read_only.unwrap_or(false),
        })
        .collect();

    let log_config = host.log_config.and_then(|lc| {
        lc.typ.filter(|d| !d.is_empty()).map(|driver| LogConfig {
            driver,
            options: lc.config.unwrap_or_default(),
        })
    });

    HostConfig {
        restart_policy: restart_policy_from_model(host.restart_policy),
        auto_remove: host.auto_remove.unwrap_or(false),
        network_mode: NetworkMode::parse(host.network_mode.as_deref().unwrap_or_default()),
        port_bindings,
        binds: host.binds.unwrap_or_default(),
        mounts,
        links: host.links.unwrap_or_default(),
        extra_hosts: host.extra_hosts.unwrap_or_default(),
        dns: host.dns.unwrap_or_default(),
        cap_add: host.cap_add.unwrap_or_default(),
        cap_drop: host.cap_drop.unwrap_or_default(),
        privileged: host.privileged.unwrap_or(false),
        volumes_from: host.volumes_from.unwrap_or_default(),
        resources: ResourceLimits {
            memory: host.memory.filter(|m| *m > 0),
            nano_cpus: host.nano_cpus.filter(|n| *n > 0),
        },
        log_config,
    }
}

fn host_config_to_model(host: &HostConfig) -> bollard::models::HostConfig {
    let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
    for port in &host.port_bindings {
        port_bindings
            .entry(port.port_key())
            .or_insert_with(|| Some(Vec::new()))
            .get_or_insert_with(Vec::new)
            .push(PortBinding {
                host_ip: port.host_ip.clone(),
                host_port: port.host_port.map(|p| p.to_string()),
            });
    }

    let mounts: Vec<Mount> = host
        .mounts
        .iter()
        .map(|m| Mount {
            source: Some(m.source.clone()),
            target: Some(m.target.clone()),
            typ: Some(match m.kind {
                MountKind::Bind => MountTypeEnum::BIND,
                MountKind::Volume => MountTypeEnum::VOLUME,
                MountKind::Tmpfs => MountTypeEnum::TMPFS,
            }),
            read_only: Some(m.read_only),
            ..Default::default()
        })
        .collect();

    bollard::models::HostConfig {
        restart_policy: Some(restart_policy_to_model(&host.restart_policy)),
        auto_remove: Some(host.auto_remove),
        network_mode: host.network_mode.as_daemon_str(),
        port_bindings: if port_bindings.is_empty() {
            None
        } else {
            Some(port_bindings)
        },
        binds: non_empty(host.binds.clone()),
        mounts: non_empty(mounts),
        links: non_empty(host.links.clone()),
        extra_hosts: non_empty(host.extra_hosts.clone()),
        dns: non_empty(host.dns.clone()),
        cap_add: non_empty(host.cap_add.clone()),
        cap_drop: non_empty(host.cap_drop.clone()),
        privileged: Some(host.privileged),
        volumes_from: non_empty(host.volumes_from.clone()),
        memory: host.resources.memory,
        nano_cpus: host.resources.nano_cpus,
        log_config: host.log_config.as_ref().map(|lc| HostConfigLogConfig {
            typ: Some(lc.driver.clone()),
            config: non_empty_map(lc.options.clone()),
        }),
        ..Default::default()
    }
}

fn endpoint_from_model(endpoint: EndpointSettings) -> EndpointConfig {
    let ipam = endpoint.ipam_config.unwrap_or_default();
    EndpointConfig {
        aliases: endpoint.aliases.unwrap_or_default(),
        links: endpoint.links.unwrap_or_default(),
        ipv4_address: non_blank(ipam.ipv4_address),
        ipv6_address: non_blank(ipam.ipv6_address),
        network_id: endpoint.network_id.unwrap_or_default(),
        ip_address: endpoint.ip_address.unwrap_or_default(),
        gateway: endpoint.gateway.unwrap_or_default(),
    }
}

fn endpoint_to_model(endpoint: &EndpointConfig) -> EndpointSettings {
    let ipam_config = if endpoint.ipv4_address.is_some() || endpoint.ipv6_address.is_some() {
        Some(EndpointIpamConfig {
            ipv4_address: endpoint.ipv4_address.clone(),
            ipv6_address: endpoint.ipv6_address.clone(),
            ..Default::default()
        })
    } else {
        None
    };

    EndpointSettings {
        aliases: non_empty(endpoint.aliases.clone()),
        links: non_empty(endpoint.links.clone()),
        ipam_config,
        ..Default::default()
    }
}

fn container_state_from_model(
    state: Option<&bollard::models::ContainerState>,
) -> ContainerState {
    state
        .and_then(|s| s.status)
        .map(|s| match s {
            bollard::models::ContainerStateStatusEnum::CREATED => ContainerState::Created,
            bollard::models::ContainerStateStatusEnum::RUNNING => ContainerState::Running,
            bollard::models::ContainerStateStatusEnum::PAUSED => ContainerState::Paused,
            bollard::models::ContainerStateStatusEnum::RESTARTING => ContainerState::Restarting,
            bollard::models::ContainerStateStatusEnum::REMOVING => ContainerState::Removing,
            bollard::models::ContainerStateStatusEnum::EXITED => ContainerState::Exited,
            bollard::models::ContainerStateStatusEnum::DEAD => ContainerState::Dead,
            _ => ContainerState::Exited,
        })
        .unwrap_or(ContainerState::Exited)
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Container runtime implementation using bollard.
///
/// Supports both Docker and Podman via Docker-compatible API.
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
}

impl BollardRuntime {
    /// Create a new BollardRuntime from a Docker client.
    pub fn new(client: Docker, runtime_type: RuntimeType) -> Self {
        Self {
            client,
            runtime_type,
        }
    }

    /// Connect to a container runtime using detected runtime info.
    ///
    /// Use with `detect_local()` or `resolve_runtime()` to connect to a runtime.
    pub fn connect(info: &super::types::RuntimeInfo) -> Result<Self, RuntimeInfoError> {
        let client =
            Docker::connect_with_unix(&info.socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(client, info.runtime_type))
    }

    /// Get the runtime type (Docker or Podman).
    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }
}

#[async_trait]
impl RuntimeInfo for BollardRuntime {
    async fn info(&self) -> Result<RuntimeMetadata, RuntimeInfoError> {
        let info = self
            .client
            .info()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;

        Ok(RuntimeMetadata {
            name: self.runtime_type.to_string(),
            version: info.server_version.unwrap_or_default(),
            api_version: bollard::API_DEFAULT_VERSION.to_string(),
            os: info.operating_system.unwrap_or_default(),
            arch: info.architecture.unwrap_or_default(),
        })
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        self.client
            .ping()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        let image_name = reference.to_string();

        let opts = CreateImageOptions {
            from_image: Some(image_name.clone()),
            ..Default::default()
        };

        let credentials = auth.map(|a| bollard::auth::DockerCredentials {
            username: Some(a.username.clone()),
            password: Some(a.password.clone()),
            serveraddress: a.server.clone(),
            ..Default::default()
        });

        // The daemon aborts the pull unless the progress stream is read to the end.
        let mut stream = self.client.create_image(Some(opts), None, credentials);
        while let Some(result) = stream.next().await {
            let progress = result.map_err(|e| map_image_pull_error(e, &image_name))?;
            if let Some(status) = progress.status {
                tracing::trace!(image = %image_name, "{}", status);
            }
        }

        Ok(())
    }

    async fn inspect_image(&self, reference: &str) -> Result<ImageDetails, ImageError> {
        let details = self
            .client
            .inspect_image(reference)
            .await
            .map_err(|e| map_image_inspect_error(e, reference))?;

        let defaults = details
            .config
            .map(|c| ImageDefaults {
                env: c.env.unwrap_or_default(),
                cmd: c.cmd,
                entrypoint: c.entrypoint,
                labels: c.labels.unwrap_or_default(),
                exposed_ports: c.exposed_ports.unwrap_or_default(),
                volumes: c.volumes.unwrap_or_default(),
                working_dir: non_blank(c.working_dir),
                user: non_blank(c.user),
            })
            .unwrap_or_default();

        Ok(ImageDetails {
            id: ImageId::new(details.id.unwrap_or_default()),
            repo_tags: details.repo_tags.unwrap_or_default(),
            repo_digests: details.repo_digests.unwrap_or_default(),
            defaults,
        })
    }

    async fn remove_image(&self, id: &ImageId, force: bool) -> Result<(), ImageError> {
        let opts = RemoveImageOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_image(id.as_str(), Some(opts), None)
            .await
            .map_err(|e| map_image_remove_error(e, id.as_str()))?;

        Ok(())
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let opts = ListContainersOptions {
            all: filters.all,
            ..Default::default()
        };

        let containers = self
            .client
            .list_containers(Some(opts))
            .await
            .map_err(|e| ContainerError::Runtime(e.to_string()))?;

        Ok(containers
            .into_iter()
            .map(|c| {
                let name = c
                    .names
                    .unwrap_or_default()
                    .first()
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_default();

                ContainerSummary {
                    id: ContainerId::new(c.id.unwrap_or_default()),
                    name,
                    image: c.image.unwrap_or_default(),
                    state: c
                        .state
                        .map(|s| format!("{:?}", s).to_lowercase())
                        .unwrap_or_default(),
                    labels: c.labels.unwrap_or_default(),
                }
            })
            .collect())
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerInfo, ContainerError> {
        let details = self
            .client
            .inspect_container(id.as_str(), None::<InspectContainerOptions>)
            .await
            .map_err(map_container_not_found_error)?;

        let state = container_state_from_model(details.state.as_ref());

        let networks = details
            .network_settings
            .and_then(|ns| ns.networks)
            .unwrap_or_default()
            .into_iter()
            .map(|(name, endpoint)| (name, endpoint_from_model(endpoint)))
            .collect();

        Ok(ContainerInfo {
            id: ContainerId::new(details.id.unwrap_or_else(|| id.to_string())),
            name: details
                .name
                .unwrap_or_default()
                .trim_start_matches('/')
                .to_string(),
            image_id: ImageId::new(details.image.unwrap_or_default()),
            state,
            created: details.created.map(|dt| dt.to_string()).unwrap_or_default(),
            config: run_config_from_model(details.config),
            host_config: host_config_from_model(details.host_config),
            networks,
        })
    }

    async fn kill_container(&self, id: &ContainerId, signal: &str) -> Result<(), ContainerError> {
        let opts = KillContainerOptions {
            signal: signal.to_string(),
        };

        self.client
            .kill_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_kill_error)
    }

    async fn remove_container(
        &self,
        id: &ContainerId,
        options: RemoveOptions,
    ) -> Result<(), ContainerError> {
        let opts = RemoveContainerOptions {
            force: options.force,
            v: options.remove_volumes,
            ..Default::default()
        };

        self.client
            .remove_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_not_found_error)
    }

    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let run = &config.run;

        let endpoints: HashMap<String, EndpointSettings> = config
            .networks
            .iter()
            .map(|(name, endpoint)| (name.clone(), endpoint_to_model(endpoint)))
            .collect();
        let networking_config = if endpoints.is_empty() {
            None
        } else {
            Some(bollard::models::NetworkingConfig {
                endpoints_config: Some(endpoints),
            })
        };

        let container_config = ContainerCreateBody {
            image: Some(run.image.clone()),
            env: non_empty(run.env.clone()),
            cmd: run.cmd.clone(),
            entrypoint: run.entrypoint.clone(),
            labels: non_empty_map(run.labels.clone()),
            exposed_ports: non_empty(run.exposed_ports.clone()),
            volumes: non_empty(run.volumes.clone()),
            working_dir: run.working_dir.clone(),
            user: run.user.clone(),
            hostname: run.hostname.clone(),
            stop_signal: run.stop_signal.clone(),
            stop_timeout: run.stop_timeout,
            tty: Some(run.tty),
            open_stdin: Some(run.open_stdin),
            host_config: Some(host_config_to_model(&config.host)),
            networking_config,
            ..Default::default()
        };

        let opts = CreateContainerOptions {
            name: Some(config.name.clone()),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(opts), container_config)
            .await
            .map_err(map_container_create_error)?;

        for warning in response.warnings {
            tracing::warn!(container = %config.name, "{}", warning);
        }

        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.client
            .start_container(
                id.as_str(),
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await
            .map_err(map_container_start_error)
    }

    async fn rename_container(
        &self,
        id: &ContainerId,
        new_name: &str,
    ) -> Result<(), ContainerError> {
        self.client
            .rename_container(
                id.as_str(),
                bollard::query_parameters::RenameContainerOptions {
                    name: new_name.to_string(),
                },
            )
            .await
            .map_err(map_container_rename_error)
    }
}

#[async_trait]
impl NetworkOps for BollardRuntime {
    async fn connect_to_network(
        &self,
        container: &ContainerId,
        network: &str,
        endpoint: &EndpointConfig,
    ) -> Result<(), NetworkError> {
        let config = bollard::models::NetworkConnectRequest {
            container: container.to_string(),
            endpoint_config: Some(endpoint_to_model(endpoint)),
        };

        self.client
            .connect_network(network, config)
            .await
            .map_err(map_network_connect_error)
    }

    async fn disconnect_from_network(
        &self,
        container: &ContainerId,
        network: &str,
        force: bool,
    ) -> Result<(), NetworkError> {
        let config = bollard::models::NetworkDisconnectRequest {
            container: container.to_string(),
            force: Some(force),
        };

        self.client
            .disconnect_network(network, config)
            .await
            .map_err(map_network_disconnect_error)
    }
}

#[async_trait]
impl ExecOps for BollardRuntime {
    async fn exec_create(
        &self,
        container: &ContainerId,
        config: &ExecConfig,
    ) -> Result<ExecId, ExecError> {
        let opts = bollard::models::ExecConfig {
            cmd: Some(config.cmd.clone()),
            env: non_empty(config.env.clone()),
            working_dir: config.working_dir.clone(),
            user: config.user.clone(),
            attach_stdin: Some(false),
            attach_stdout: Some(config.attach_stdout),
            attach_stderr: Some(config.attach_stderr),
            tty: Some(config.tty),
            ..Default::default()
        };

        let response = self
            .client
            .create_exec(container.as_str(), opts)
            .await
            .map_err(map_exec_create_error)?;

        Ok(ExecId::new(response.id))
    }

    async fn exec_start(&self, exec_id: &ExecId, detach: bool) -> Result<ExecStart, ExecError> {
        // Podman's exec output stream may never close; attached starts would hang.
        let detach = detach || !self.runtime_type.supports_attached_exec();

        let opts = StartExecOptions {
            detach,
            ..Default::default()
        };

        let result = self
            .client
            .start_exec(exec_id.as_str(), Some(opts))
            .await
            .map_err(|e| map_exec_start_error(e, !detach))?;

        match result {
            bollard::exec::StartExecResults::Attached { output, .. } => {
                let stream = output.map(|item| {
                    item.map(|chunk| chunk.into_bytes())
                        .map_err(|e| ExecError::Failed(e.to_string()))
                });
                Ok(ExecStart::Attached(Box::pin(stream)))
            }
            bollard::exec::StartExecResults::Detached => Ok(ExecStart::Detached),
        }
    }

    async fn exec_inspect(&self, exec_id: &ExecId) -> Result<ExecInfo, ExecError> {
        let details = self
            .client
            .inspect_exec(exec_id.as_str())
            .await
            .map_err(map_exec_not_found_error)?;

        Ok(ExecInfo {
            id: exec_id.clone(),
            running: details.running.unwrap_or(false),
            exit_code: details.exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_keys_parse_protocols() {
        assert_eq!(parse_port_key("80/tcp"), Some((80, Protocol::Tcp)));
        assert_eq!(parse_port_key("53/udp"), Some((53, Protocol::Udp)));
        assert_eq!(parse_port_key("8080"), Some((8080, Protocol::Tcp)));
        assert_eq!(parse_port_key("abc/tcp"), None);
    }

    #[test]
    fn restart_policy_survives_conversion() {
        let policy = RestartPolicyConfig::OnFailure {
            max_retries: Some(5),
        };
        let model = restart_policy_to_model(&policy);
        assert_eq!(restart_policy_from_model(Some(model)), policy);
    }

    #[test]
    fn port_bindings_group_by_port_key() {
        let host = HostConfig {
            port_bindings: vec![
                PortMapping {
                    host_port: Some(8080),
                    container_port: 80,
                    protocol: Protocol::Tcp,
                    host_ip: None,
                },
                PortMapping {
                    host_port: Some(8443),
                    container_port: 80,
                    protocol: Protocol::Tcp,
                    host_ip: Some("127.0.0.1".to_string()),
                },
            ],
            ..Default::default()
        };

        let model = host_config_to_model(&host);
        let bindings = model.port_bindings.unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings["80/tcp"].as_ref().unwrap().len(), 2);
    }

    #[test]
    fn static_addresses_become_ipam_config() {
        let endpoint = EndpointConfig {
            aliases: vec!["web".to_string()],
            ipv4_address: Some("172.20.0.10".to_string()),
            ..Default::default()
        };
        let model = endpoint_to_model(&endpoint);
        assert_eq!(model.aliases, Some(vec!["web".to_string()]));
        assert_eq!(
            model.ipam_config.unwrap().ipv4_address.as_deref(),
            Some("172.20.0.10")
        );
    }

    #[test]
    fn daemon_rejections_of_attached_starts_are_not_attach_failures() {
        let rejected = bollard::errors::Error::DockerResponseServerError {
            status_code: 500,
            message: "OCI runtime exec failed".to_string(),
        };
        assert!(matches!(
            map_exec_start_error(rejected, true),
            ExecError::Runtime(message) if message.contains("OCI runtime exec failed")
        ));
    }

    #[test]
    fn broken_attach_streams_are_attach_failures() {
        let hijack = bollard::errors::Error::RequestTimeoutError;
        assert!(matches!(
            map_exec_start_error(hijack, true),
            ExecError::AttachFailed(_)
        ));
        assert!(matches!(
            map_exec_start_error(bollard::errors::Error::RequestTimeoutError, false),
            ExecError::Runtime(_)
        ));
    }
}
