// ABOUTME: Point-in-time snapshot of a container and the image it was started from.
// ABOUTME: Derives the run and host configuration needed to recreate the container.

mod filters;

pub use filters::{
    ContainerFilter, build_filter, filter_by_disable_label, filter_by_enable_label,
    filter_by_names, no_filter,
};

use crate::runtime::{
    ContainerConfig, ContainerInfo, EndpointConfig, HostConfig, ImageDetails, NetworkMode,
    RunConfig,
};
use crate::types::{ContainerId, ImageId, ImageRef, ParseImageRefError};
use std::collections::{BTreeSet, HashMap};

/// Label that opts a container into updates when label filtering is enabled.
pub const ENABLE_LABEL: &str = "reimage.enable";
/// Label that marks a container as watched but never replaced.
pub const MONITOR_ONLY_LABEL: &str = "reimage.monitor-only";
/// Label overriding the signal used to stop the container.
pub const STOP_SIGNAL_LABEL: &str = "reimage.stop-signal";
/// Label naming a shell command run in the old container before it is stopped.
pub const PRE_UPDATE_LABEL: &str = "reimage.lifecycle.pre-update";
/// Label naming a shell command run in the new container after it starts.
pub const POST_UPDATE_LABEL: &str = "reimage.lifecycle.post-update";

/// A container and its image, captured together at one instant.
///
/// Never refreshed in place: call `UpdateClient::get_container` again for
/// current state.
#[derive(Debug, Clone)]
pub struct Container {
    info: ContainerInfo,
    image: ImageDetails,
}

impl Container {
    pub fn new(info: ContainerInfo, image: ImageDetails) -> Self {
        Self { info, image }
    }

    pub fn id(&self) -> &ContainerId {
        &self.info.id
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// ID of the image the container was started from.
    pub fn image_id(&self) -> &ImageId {
        &self.image.id
    }

    pub fn image_info(&self) -> &ImageDetails {
        &self.image
    }

    pub fn info(&self) -> &ContainerInfo {
        &self.info
    }

    /// Configured image name, with `:latest` appended when it carries no tag or digest.
    pub fn image_name(&self) -> String {
        let image = &self.info.config.image;
        let last_segment = image.rsplit('/').next().unwrap_or(image);
        if last_segment.contains(':') || image.contains('@') {
            image.clone()
        } else {
            format!("{}:latest", image)
        }
    }

    pub fn image_ref(&self) -> Result<ImageRef, ParseImageRefError> {
        ImageRef::parse(&self.image_name())
    }

    pub fn is_running(&self) -> bool {
        self.info.is_running()
    }

    pub fn labels(&self) -> &HashMap<String, String> {
        &self.info.config.labels
    }

    fn label(&self, key: &str) -> Option<&str> {
        self.labels()
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn bool_label(&self, key: &str) -> Option<bool> {
        self.label(key).map(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Signal to stop with: the stop-signal label, then the container's own stop signal.
    pub fn stop_signal(&self) -> Option<&str> {
        self.label(STOP_SIGNAL_LABEL)
            .or(self.info.config.stop_signal.as_deref())
    }

    /// Value of the enable label, `None` when absent.
    pub fn enabled(&self) -> Option<bool> {
        self.bool_label(ENABLE_LABEL)
    }

    pub fn is_monitor_only(&self) -> bool {
        self.bool_label(MONITOR_ONLY_LABEL).unwrap_or(false)
    }

    pub fn pre_update_command(&self) -> Option<&str> {
        self.label(PRE_UPDATE_LABEL)
    }

    pub fn post_update_command(&self) -> Option<&str> {
        self.label(POST_UPDATE_LABEL)
    }

    pub fn network_mode(&self) -> &NetworkMode {
        &self.info.host_config.network_mode
    }

    pub fn auto_remove(&self) -> bool {
        self.info.host_config.auto_remove
    }

    /// Endpoint settings by network name, as captured.
    pub fn network_endpoints(&self) -> &HashMap<String, EndpointConfig> {
        &self.info.networks
    }

    /// Run configuration for a replacement, with everything the image supplies
    /// by default stripped so the new image's defaults apply.
    pub fn runtime_config(&self) -> RunConfig {
        let mut config = self.info.config.clone();
        let defaults = &self.image.defaults;

        if config.working_dir == defaults.working_dir {
            config.working_dir = None;
        }
        if config.user == defaults.user {
            config.user = None;
        }
        if self.network_mode().is_container() {
            config.hostname = None;
        }

        // Cmd is only inherited when the entrypoint is too.
        if config.entrypoint == defaults.entrypoint {
            config.entrypoint = None;
            if config.cmd == defaults.cmd {
                config.cmd = None;
            }
        }

        config.env.retain(|entry| !defaults.env.contains(entry));
        config
            .labels
            .retain(|key, value| defaults.labels.get(key) != Some(value));
        config
            .volumes
            .retain(|volume| !defaults.volumes.contains(volume));

        let mut exposed: BTreeSet<String> = config
            .exposed_ports
            .into_iter()
            .filter(|port| !defaults.exposed_ports.contains(port))
            .collect();
        for binding in &self.info.host_config.port_bindings {
            exposed.insert(binding.port_key());
        }
        config.exposed_ports = exposed.into_iter().collect();

        config.image = self.image_name();
        config
    }

    /// Host configuration for a replacement, with links in `name:alias` form.
    pub fn host_config(&self) -> HostConfig {
        let mut host = self.info.host_config.clone();
        host.links = host.links.iter().map(|link| normalize_link(link)).collect();
        host
    }

    /// Creation parameters for a replacement carrying the original name and no networks.
    pub fn creation_config(&self) -> ContainerConfig {
        ContainerConfig {
            name: self.name().to_string(),
            run: self.runtime_config(),
            host: self.host_config(),
            networks: HashMap::new(),
        }
    }
}

/// Turns the daemon's `/source:/target/alias` link form into `source:alias`.
fn normalize_link(link: &str) -> String {
    match link.split_once(':') {
        Some((source, target)) => {
            let source = source.trim_start_matches('/');
            let alias = target.rsplit('/').next().unwrap_or(target);
            format!("{}:{}", source, alias)
        }
        None => link.trim_start_matches('/').to_string(),
    }
}
