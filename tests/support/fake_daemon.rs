// ABOUTME: In-memory container daemon that records every call.
// ABOUTME: Implements all runtime capability traits with scriptable failure modes.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reimage::runtime::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerInfo, ContainerOps,
    ContainerState, ContainerSummary, EndpointConfig, ExecConfig, ExecError, ExecInfo, ExecOps,
    ExecStart, HostConfig, ImageDefaults, ImageDetails, ImageError, ImageOps, NetworkError,
    NetworkOps, RegistryAuth, RemoveOptions, RunConfig,
};
use reimage::types::{ContainerId, ExecId, ImageId, ImageRef};
use std::collections::{BTreeSet, HashMap};

/// One daemon call, in the order received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    InspectContainer(String),
    Kill { id: String, signal: String },
    Remove { id: String, force: bool, volumes: bool },
    Create { name: String, networks: Vec<String> },
    Start(String),
    Rename { id: String, name: String },
    Pull { image: String, authenticated: bool },
    InspectImage(String),
    RemoveImage(String),
    Connect { id: String, network: String, aliases: Vec<String> },
    Disconnect { id: String, network: String, force: bool },
    ExecCreate { id: String, cmd: Vec<String>, tty: bool },
    ExecStart { detach: bool },
    ExecInspect,
}

impl Call {
    /// Whether this call touches networks.
    pub fn is_network(&self) -> bool {
        matches!(self, Call::Connect { .. } | Call::Disconnect { .. })
    }
}

#[derive(Debug, Clone)]
struct ExecScript {
    exit_code: i64,
    output: String,
    running_polls: u32,
}

#[derive(Debug, Clone)]
struct ExecRecord {
    script: ExecScript,
}

#[derive(Default)]
struct State {
    containers: Vec<ContainerInfo>,
    images: HashMap<String, ImageDetails>,
    pull_results: HashMap<String, ImageDetails>,
    execs: HashMap<String, ExecRecord>,
    scripts: HashMap<String, ExecScript>,
    calls: Vec<Call>,
    next_id: u32,
    ignore_kill: bool,
    ignore_remove: bool,
    attach_fails: bool,
    fail_create: Option<String>,
    fail_pull: Option<ImageError>,
    fail_kill: Option<ContainerError>,
    fail_remove: Option<ContainerError>,
    fail_inspect: Option<ContainerError>,
    fail_connect: Option<NetworkError>,
    fail_disconnect: Option<NetworkError>,
    fail_exec_start: Option<ExecError>,
}

/// A recording in-memory daemon.
#[derive(Default)]
pub struct FakeDaemon {
    state: Mutex<State>,
}

/// Image details with empty defaults.
pub fn image(id: &str) -> ImageDetails {
    ImageDetails {
        id: ImageId::from(id),
        repo_tags: vec![],
        repo_digests: vec![],
        defaults: ImageDefaults::default(),
    }
}

/// A running container built from `image`.
pub fn running(name: &str, image: &str, image_id: &str) -> ContainerInfo {
    ContainerInfo {
        id: ContainerId::new(format!("{}0123456789abcdef", name)),
        name: name.to_string(),
        image_id: ImageId::from(image_id),
        state: ContainerState::Running,
        created: "2024-01-01T00:00:00Z".to_string(),
        config: RunConfig {
            image: image.to_string(),
            ..Default::default()
        },
        host_config: HostConfig::default(),
        networks: HashMap::new(),
    }
}

/// Endpoint settings with the given aliases.
pub fn endpoint(aliases: &[&str]) -> EndpointConfig {
    EndpointConfig {
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        ..Default::default()
    }
}

impl FakeDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `reference` (and the image's own ID) resolve to an image with `id`.
    pub fn add_image(&self, reference: &str, id: &str) {
        self.add_image_details(reference, image(id));
    }

    pub fn add_image_details(&self, reference: &str, details: ImageDetails) {
        let mut state = self.state.lock();
        state
            .images
            .insert(details.id.as_str().to_string(), details.clone());
        state.images.insert(reference.to_string(), details);
    }

    pub fn add_container(&self, info: ContainerInfo) -> ContainerId {
        let id = info.id.clone();
        self.state.lock().containers.push(info);
        id
    }

    /// Pulling `reference` makes it resolve to a new image with `id`.
    pub fn on_pull(&self, reference: &str, id: &str) {
        self.state
            .lock()
            .pull_results
            .insert(reference.to_string(), image(id));
    }

    pub fn fail_pull(&self, error: ImageError) {
        self.state.lock().fail_pull = Some(error);
    }

    /// Kills are accepted but the container keeps running.
    pub fn ignore_kill(&self) {
        self.state.lock().ignore_kill = true;
    }

    /// Removals are accepted but the container stays.
    pub fn ignore_remove(&self) {
        self.state.lock().ignore_remove = true;
    }

    pub fn fail_create(&self, message: &str) {
        self.state.lock().fail_create = Some(message.to_string());
    }

    /// The next kill is rejected with `error`.
    pub fn fail_kill(&self, error: ContainerError) {
        self.state.lock().fail_kill = Some(error);
    }

    /// The next removal is rejected with `error`.
    pub fn fail_remove(&self, error: ContainerError) {
        self.state.lock().fail_remove = Some(error);
    }

    /// The next container inspection is rejected with `error`.
    pub fn fail_inspect(&self, error: ContainerError) {
        self.state.lock().fail_inspect = Some(error);
    }

    pub fn fail_connect(&self, error: NetworkError) {
        self.state.lock().fail_connect = Some(error);
    }

    pub fn fail_disconnect(&self, error: NetworkError) {
        self.state.lock().fail_disconnect = Some(error);
    }

    /// The next exec start is rejected by the daemon, attached or not.
    pub fn fail_exec_start(&self, error: ExecError) {
        self.state.lock().fail_exec_start = Some(error);
    }

    /// Attached exec starts fail; detached ones work.
    pub fn fail_attach(&self) {
        self.state.lock().attach_fails = true;
    }

    /// Running `command` reports `exit_code` and prints `output`.
    pub fn script_exec(&self, command: &str, exit_code: i64, output: &str) {
        self.script_exec_running(command, exit_code, output, 0);
    }

    /// Like `script_exec`, but the exec reports running for `polls` inspections.
    pub fn script_exec_running(&self, command: &str, exit_code: i64, output: &str, polls: u32) {
        self.state.lock().scripts.insert(
            command.to_string(),
            ExecScript {
                exit_code,
                output: output.to_string(),
                running_polls: polls,
            },
        );
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Current state of the container with `name`, if it exists.
    pub fn container_named(&self, name: &str) -> Option<ContainerInfo> {
        self.state
            .lock()
            .containers
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    /// Drop a container behind the client's back.
    pub fn delete_container(&self, id: &ContainerId) {
        self.state.lock().containers.retain(|c| &c.id != id);
    }

    pub fn container_count(&self) -> usize {
        self.state.lock().containers.len()
    }

    /// Networks the container with `id` is attached to.
    pub fn networks_of(&self, id: &ContainerId) -> BTreeSet<String> {
        self.state
            .lock()
            .containers
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.networks.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_image(&self, id: &str) -> bool {
        self.state.lock().images.values().any(|i| i.id.as_str() == id)
    }
}

impl State {
    fn record(&mut self, call: Call) {
        self.calls.push(call);
    }

    fn position(&self, id: &ContainerId) -> Option<usize> {
        self.containers
            .iter()
            .position(|c| &c.id == id || c.name == id.as_str())
    }

    fn container_mut(&mut self, id: &ContainerId) -> Result<&mut ContainerInfo, ContainerError> {
        match self.position(id) {
            Some(i) => Ok(&mut self.containers[i]),
            None => Err(ContainerError::NotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl ContainerOps for FakeDaemon {
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let mut state = self.state.lock();
        state.record(Call::List);
        Ok(state
            .containers
            .iter()
            .filter(|c| filters.all || c.is_running())
            .map(|c| ContainerSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                image: c.config.image.clone(),
                state: "running".to_string(),
                labels: c.config.labels.clone(),
            })
            .collect())
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerInfo, ContainerError> {
        let mut state = self.state.lock();
        state.record(Call::InspectContainer(id.to_string()));
        if let Some(error) = state.fail_inspect.take() {
            return Err(error);
        }
        let position = state
            .position(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        Ok(state.containers[position].clone())
    }

    async fn kill_container(&self, id: &ContainerId, signal: &str) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        state.record(Call::Kill {
            id: id.to_string(),
            signal: signal.to_string(),
        });
        if let Some(error) = state.fail_kill.take() {
            return Err(error);
        }
        let ignore = state.ignore_kill;
        let container = state.container_mut(id)?;
        if !container.is_running() {
            return Err(ContainerError::NotRunning(id.to_string()));
        }
        if ignore {
            return Ok(());
        }
        container.state = ContainerState::Exited;
        if container.host_config.auto_remove {
            let id = container.id.clone();
            state.containers.retain(|c| c.id != id);
        }
        Ok(())
    }

    async fn remove_container(
        &self,
        id: &ContainerId,
        options: RemoveOptions,
    ) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        state.record(Call::Remove {
            id: id.to_string(),
            force: options.force,
            volumes: options.remove_volumes,
        });
        if let Some(error) = state.fail_remove.take() {
            return Err(error);
        }
        let position = state
            .position(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        if !state.ignore_remove {
            state.containers.remove(position);
        }
        Ok(())
    }

    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let mut state = self.state.lock();
        state.record(Call::Create {
            name: config.name.clone(),
            networks: config.networks.keys().cloned().collect(),
        });

        if let Some(message) = state.fail_create.clone() {
            return Err(ContainerError::Runtime(message));
        }
        if config.networks.len() > 1 {
            return Err(ContainerError::InvalidConfig(
                "container can only be created with one network".to_string(),
            ));
        }
        if state.containers.iter().any(|c| c.name == config.name) {
            return Err(ContainerError::AlreadyExists(config.name.clone()));
        }
        let image_id = state
            .images
            .get(&config.run.image)
            .map(|i| i.id.clone())
            .ok_or_else(|| ContainerError::ImageNotFound(config.run.image.clone()))?;

        state.next_id += 1;
        let id = ContainerId::new(format!("created{:04}abcdef0123", state.next_id));
        state.containers.push(ContainerInfo {
            id: id.clone(),
            name: config.name.clone(),
            image_id,
            state: ContainerState::Created,
            created: "2024-06-01T00:00:00Z".to_string(),
            config: config.run.clone(),
            host_config: config.host.clone(),
            networks: config.networks.clone(),
        });
        Ok(id)
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        state.record(Call::Start(id.to_string()));
        let container = state.container_mut(id)?;
        if container.is_running() {
            return Err(ContainerError::AlreadyRunning(id.to_string()));
        }
        container.state = ContainerState::Running;
        Ok(())
    }

    async fn rename_container(
        &self,
        id: &ContainerId,
        new_name: &str,
    ) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        state.record(Call::Rename {
            id: id.to_string(),
            name: new_name.to_string(),
        });
        if state.containers.iter().any(|c| c.name == new_name) {
            return Err(ContainerError::AlreadyExists(new_name.to_string()));
        }
        state.container_mut(id)?.name = new_name.to_string();
        Ok(())
    }
}

#[async_trait]
impl ImageOps for FakeDaemon {
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        let mut state = self.state.lock();
        let name = reference.to_string();
        state.record(Call::Pull {
            image: name.clone(),
            authenticated: auth.is_some(),
        });
        if let Some(error) = state.fail_pull.take() {
            return Err(error);
        }
        if let Some(details) = state.pull_results.get(&name).cloned() {
            state
                .images
                .insert(details.id.as_str().to_string(), details.clone());
            state.images.insert(name, details);
        }
        Ok(())
    }

    async fn inspect_image(&self, reference: &str) -> Result<ImageDetails, ImageError> {
        let mut state = self.state.lock();
        state.record(Call::InspectImage(reference.to_string()));
        state
            .images
            .get(reference)
            .cloned()
            .ok_or_else(|| ImageError::NotFound(reference.to_string()))
    }

    async fn remove_image(&self, id: &ImageId, _force: bool) -> Result<(), ImageError> {
        let mut state = self.state.lock();
        state.record(Call::RemoveImage(id.to_string()));
        let before = state.images.len();
        state.images.retain(|_, details| &details.id != id);
        if state.images.len() == before {
            return Err(ImageError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NetworkOps for FakeDaemon {
    async fn connect_to_network(
        &self,
        container: &ContainerId,
        network: &str,
        endpoint: &EndpointConfig,
    ) -> Result<(), NetworkError> {
        let mut state = self.state.lock();
        state.record(Call::Connect {
            id: container.to_string(),
            network: network.to_string(),
            aliases: endpoint.aliases.clone(),
        });
        if let Some(error) = state.fail_connect.take() {
            return Err(error);
        }
        let target = state
            .container_mut(container)
            .map_err(|_| NetworkError::ContainerNotFound(container.to_string()))?;
        if target.networks.contains_key(network) {
            return Err(NetworkError::Runtime(format!(
                "endpoint with name {} already exists in network {}",
                target.name, network
            )));
        }
        target
            .networks
            .insert(network.to_string(), endpoint.clone());
        Ok(())
    }

    async fn disconnect_from_network(
        &self,
        container: &ContainerId,
        network: &str,
        force: bool,
    ) -> Result<(), NetworkError> {
        let mut state = self.state.lock();
        state.record(Call::Disconnect {
            id: container.to_string(),
            network: network.to_string(),
            force,
        });
        if let Some(error) = state.fail_disconnect.take() {
            return Err(error);
        }
        let target = state
            .container_mut(container)
            .map_err(|_| NetworkError::ContainerNotFound(container.to_string()))?;
        target
            .networks
            .remove(network)
            .map(|_| ())
            .ok_or_else(|| NetworkError::NotConnected(network.to_string()))
    }
}

#[async_trait]
impl ExecOps for FakeDaemon {
    async fn exec_create(
        &self,
        container: &ContainerId,
        config: &ExecConfig,
    ) -> Result<ExecId, ExecError> {
        let mut state = self.state.lock();
        state.record(Call::ExecCreate {
            id: container.to_string(),
            cmd: config.cmd.clone(),
            tty: config.tty,
        });
        let position = state
            .position(container)
            .ok_or_else(|| ExecError::ContainerNotFound(container.to_string()))?;
        if !state.containers[position].is_running() {
            return Err(ExecError::ContainerNotRunning(container.to_string()));
        }
        let command = config.cmd.last().cloned().unwrap_or_default();
        let script = state.scripts.get(&command).cloned().unwrap_or(ExecScript {
            exit_code: 0,
            output: String::new(),
            running_polls: 0,
        });

        state.next_id += 1;
        let id = format!("exec{}", state.next_id);
        state.execs.insert(id.clone(), ExecRecord { script });
        Ok(ExecId::new(id))
    }

    async fn exec_start(&self, exec_id: &ExecId, detach: bool) -> Result<ExecStart, ExecError> {
        let mut state = self.state.lock();
        state.record(Call::ExecStart { detach });
        if let Some(error) = state.fail_exec_start.take() {
            return Err(error);
        }
        let record = state
            .execs
            .get(exec_id.as_str())
            .cloned()
            .ok_or_else(|| ExecError::ExecNotFound(exec_id.to_string()))?;
        if detach {
            return Ok(ExecStart::Detached);
        }
        if state.attach_fails {
            return Err(ExecError::AttachFailed("hijack failed".to_string()));
        }
        let chunks: Vec<Result<Bytes, ExecError>> =
            vec![Ok(Bytes::from(format!("{}\r\n", record.script.output)))];
        Ok(ExecStart::Attached(Box::pin(futures::stream::iter(chunks))))
    }

    async fn exec_inspect(&self, exec_id: &ExecId) -> Result<ExecInfo, ExecError> {
        let mut state = self.state.lock();
        state.record(Call::ExecInspect);
        let record = state
            .execs
            .get_mut(exec_id.as_str())
            .ok_or_else(|| ExecError::ExecNotFound(exec_id.to_string()))?;
        let running = record.script.running_polls > 0;
        if running {
            record.script.running_polls -= 1;
        }
        Ok(ExecInfo {
            id: exec_id.clone(),
            running,
            exit_code: if running {
                None
            } else {
                Some(record.script.exit_code)
            },
        })
    }
}
