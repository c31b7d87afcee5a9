// ABOUTME: Recreates a container from its snapshot and restores its network attachments.
// ABOUTME: Creates with one network, swaps in the full set, then starts.

use snafu::ResultExt;
use std::collections::{BTreeMap, HashMap};

use super::error::{
    ConnectNetworkSnafu, CreateContainerSnafu, DisconnectNetworkSnafu, StartContainerSnafu,
    UpdateError,
};
use crate::container::Container;
use crate::runtime::{ContainerOps, EndpointConfig, NetworkOps};
use crate::types::ContainerId;

/// The single network a container is created on.
///
/// The daemon rejects creation with more than one network, so one entry is
/// picked deterministically: the lexicographically smallest name.
pub fn select_simple_network(
    endpoints: &HashMap<String, EndpointConfig>,
) -> Option<(&String, &EndpointConfig)> {
    endpoints.iter().min_by(|a, b| a.0.cmp(b.0))
}

/// Endpoint settings to reconnect with, minus the alias the daemon derived
/// from the old container's short ID.
fn reconnect_endpoints(container: &Container) -> BTreeMap<String, EndpointConfig> {
    let old_alias = container.id().short();
    container
        .network_endpoints()
        .iter()
        .map(|(network, endpoint)| {
            let mut endpoint = endpoint.clone();
            endpoint.aliases.retain(|alias| alias != old_alias);
            (network.clone(), endpoint)
        })
        .collect()
}

/// Create a replacement for `container` under the same name, restore its
/// networks, and start it. Returns the new container's ID.
///
/// Nothing is rolled back on failure; a created but unstarted container or a
/// partial network set may remain.
pub async fn start_container<R: ContainerOps + NetworkOps + ?Sized>(
    runtime: &R,
    container: &Container,
) -> Result<ContainerId, UpdateError> {
    let name = container.name();
    let endpoints: HashMap<String, EndpointConfig> =
        reconnect_endpoints(container).into_iter().collect();

    let mut config = container.creation_config();
    let simple = select_simple_network(&endpoints).map(|(network, endpoint)| {
        config.networks.insert(network.clone(), endpoint.clone());
        network.clone()
    });

    tracing::info!(container = %name, image = %config.run.image, "creating container");
    let new_id = runtime
        .create_container(&config)
        .await
        .context(CreateContainerSnafu { name })?;

    if !container.network_mode().is_host() {
        if let Some(network) = &simple {
            tracing::debug!(container = %name, network = %network, "disconnecting creation network");
            runtime
                .disconnect_from_network(&new_id, network, true)
                .await
                .context(DisconnectNetworkSnafu {
                    name,
                    network: network.as_str(),
                })?;
        }

        let ordered: BTreeMap<&String, &EndpointConfig> = endpoints.iter().collect();
        for (network, endpoint) in ordered {
            tracing::debug!(container = %name, network = %network, "connecting network");
            runtime
                .connect_to_network(&new_id, network, endpoint)
                .await
                .context(ConnectNetworkSnafu {
                    name,
                    network: network.as_str(),
                })?;
        }
    }

    tracing::debug!(container = %name, id = %new_id.short(), "starting container");
    runtime
        .start_container(&new_id)
        .await
        .context(StartContainerSnafu {
            name,
            id: new_id.clone(),
        })?;

    Ok(new_id)
}
