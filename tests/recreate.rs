// ABOUTME: Integration tests for recreating a container and restoring its networks.
// ABOUTME: Single-network creation, reconnection order, alias cleanup, and host mode.

mod support;

use proptest::prelude::*;
use reimage::runtime::{ContainerInfo, NetworkError, NetworkMode};
use reimage::update::UpdateError;
use reimage::update::{UpdateClient, UpdateOptions};
use std::collections::BTreeSet;
use support::fake_daemon::{Call, FakeDaemon, endpoint, running};

fn client_with(configure: impl FnOnce(&mut ContainerInfo)) -> UpdateClient<FakeDaemon> {
    let daemon = FakeDaemon::new();
    daemon.add_image("nginx:latest", "sha256:bbb");
    daemon.add_image("sha256:aaa", "sha256:aaa");
    let mut info = running("web", "nginx", "sha256:aaa");
    configure(&mut info);
    let _ = daemon.add_container(info);
    UpdateClient::new(daemon, UpdateOptions::default())
}

/// Snapshot `web`, delete it, and start its replacement.
async fn replace_web(client: &UpdateClient<FakeDaemon>) -> reimage::types::ContainerId {
    let id = client.runtime().container_named("web").unwrap().id;
    let container = client.get_container(&id).await.unwrap();
    client.runtime().delete_container(&id);
    client.runtime().clear_calls();
    client.start_container(&container).await.unwrap()
}

#[tokio::test]
async fn restores_every_network() {
    support::init_tracing();
    let client = client_with(|info| {
        info.networks.insert("frontend".to_string(), endpoint(&["web"]));
        info.networks.insert("backend".to_string(), endpoint(&["web", "db-client"]));
    });

    let new_id = replace_web(&client).await;

    let networks = client.runtime().networks_of(&new_id);
    assert_eq!(
        networks,
        BTreeSet::from(["backend".to_string(), "frontend".to_string()])
    );

    let replacement = client.runtime().container_named("web").unwrap();
    assert_eq!(replacement.id, new_id);
    assert!(replacement.is_running());
    assert_eq!(replacement.image_id.as_str(), "sha256:bbb");
}

#[tokio::test]
async fn creates_with_a_single_network() {
    let client = client_with(|info| {
        info.networks.insert("b".to_string(), endpoint(&[]));
        info.networks.insert("a".to_string(), endpoint(&[]));
        info.networks.insert("c".to_string(), endpoint(&[]));
    });

    let _ = replace_web(&client).await;

    let calls = client.runtime().calls();
    assert_eq!(
        calls[0],
        Call::Create {
            name: "web".to_string(),
            networks: vec!["a".to_string()],
        }
    );
    assert!(matches!(&calls[1], Call::Disconnect { network, force: true, .. } if network == "a"));
    let connected: Vec<&str> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Connect { network, .. } => Some(network.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(connected, vec!["a", "b", "c"]);
    assert!(matches!(calls.last(), Some(Call::Start(_))));
}

#[tokio::test]
async fn old_short_id_alias_is_dropped() {
    let client = client_with(|info| {
        let short = info.id.short().to_string();
        info.networks
            .insert("frontend".to_string(), endpoint(&["web", short.as_str()]));
    });

    let _ = replace_web(&client).await;

    let aliases = client
        .runtime()
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::Connect { aliases, .. } => Some(aliases),
            _ => None,
        })
        .unwrap();
    assert_eq!(aliases, vec!["web".to_string()]);
}

#[tokio::test]
async fn host_mode_makes_no_network_calls() {
    let client = client_with(|info| {
        info.host_config.network_mode = NetworkMode::Host;
        info.networks.insert("host".to_string(), endpoint(&[]));
    });

    let new_id = replace_web(&client).await;

    assert!(!client.runtime().calls().iter().any(Call::is_network));
    assert_eq!(
        client.runtime().networks_of(&new_id),
        BTreeSet::from(["host".to_string()])
    );
}

#[tokio::test]
async fn no_networks_creates_plainly() {
    let client = client_with(|_| {});

    let _ = replace_web(&client).await;

    let calls = client.runtime().calls();
    assert_eq!(calls.len(), 2);
    assert!(!calls.iter().any(Call::is_network));
}

#[tokio::test]
async fn create_failure_leaves_nothing_started() {
    let client = client_with(|_| {});
    client.runtime().fail_create("no space left on device");
    let id = client.runtime().container_named("web").unwrap().id;
    let container = client.get_container(&id).await.unwrap();
    client.runtime().delete_container(&id);

    let err = client.start_container(&container).await.unwrap_err();

    assert!(err.to_string().contains("failed to create container web"));
    assert!(
        !client
            .runtime()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Start(_)))
    );
}

/// Snapshot `web` with two networks and delete it, ready for recreation.
async fn snapshot_networked_web(
    client: &UpdateClient<FakeDaemon>,
) -> reimage::container::Container {
    let id = client.runtime().container_named("web").unwrap().id;
    let container = client.get_container(&id).await.unwrap();
    client.runtime().delete_container(&id);
    client.runtime().clear_calls();
    container
}

fn two_networks(info: &mut ContainerInfo) {
    info.networks.insert("frontend".to_string(), endpoint(&["web"]));
    info.networks.insert("backend".to_string(), endpoint(&["web"]));
}

#[tokio::test]
async fn disconnect_failure_leaves_replacement_unstarted() {
    let client = client_with(two_networks);
    let container = snapshot_networked_web(&client).await;
    client
        .runtime()
        .fail_disconnect(NetworkError::Runtime("network is busy".to_string()));

    let err = client.start_container(&container).await.unwrap_err();

    assert!(matches!(err, UpdateError::DisconnectNetwork { .. }));
    let calls = client.runtime().calls();
    assert!(matches!(calls.last(), Some(Call::Disconnect { .. })));
    assert!(!calls.iter().any(|c| matches!(c, Call::Start(_) | Call::Connect { .. })));
}

#[tokio::test]
async fn connect_failure_leaves_replacement_unstarted() {
    let client = client_with(two_networks);
    let container = snapshot_networked_web(&client).await;
    client
        .runtime()
        .fail_connect(NetworkError::Runtime("address already in use".to_string()));

    let err = client.start_container(&container).await.unwrap_err();

    assert!(matches!(err, UpdateError::ConnectNetwork { .. }));
    assert!(err.to_string().contains("backend"));
    let calls = client.runtime().calls();
    assert!(matches!(calls.last(), Some(Call::Connect { .. })));
    assert!(!calls.iter().any(|c| matches!(c, Call::Start(_))));
    assert!(!client.runtime().container_named("web").unwrap().is_running());
}

#[tokio::test]
async fn rename_moves_the_name() {
    let client = client_with(|_| {});
    let id = client.runtime().container_named("web").unwrap().id;
    let container = client.get_container(&id).await.unwrap();

    client.rename_container(&container, "web-old").await.unwrap();

    assert!(client.runtime().container_named("web").is_none());
    assert_eq!(client.runtime().container_named("web-old").unwrap().id, id);
}

#[tokio::test]
async fn rename_onto_a_taken_name_fails() {
    let client = client_with(|_| {});
    let _db = client
        .runtime()
        .add_container(running("db", "postgres", "sha256:ccc"));
    let id = client.runtime().container_named("web").unwrap().id;
    let container = client.get_container(&id).await.unwrap();

    let err = client.rename_container(&container, "db").await.unwrap_err();

    assert!(matches!(err, UpdateError::RenameContainer { .. }));
    assert!(err.to_string().contains("to db"));
    assert!(client.runtime().container_named("web").is_some());
}

proptest! {
    #[test]
    fn restored_networks_match_snapshot(names in prop::collection::btree_set("[a-z]{1,8}", 1..6)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let networks = rt.block_on(async {
            let client = client_with(|info| {
                for name in &names {
                    info.networks.insert(name.clone(), endpoint(&["web"]));
                }
            });
            let new_id = replace_web(&client).await;
            client.runtime().networks_of(&new_id)
        });
        prop_assert_eq!(networks, names);
    }
}
