// ABOUTME: Integration tests against the local Docker/Podman daemon.
// ABOUTME: Skipped when no runtime socket is found on the machine.

mod support;

use reimage::runtime::{
    BollardRuntime, ContainerConfig, ContainerFilters, ContainerOps, ContainerState,
    EndpointConfig, ImageOps, RemoveOptions, RunConfig, RuntimeInfoTrait, detect_local,
};
use reimage::types::{ContainerId, ImageRef};
use reimage::update::{ExecOutcome, UpdateClient, UpdateOptions};
use std::collections::HashMap;
use std::time::Duration;

const TEST_LABEL: &str = "reimage.test";

/// Get local runtime, skipping test if unavailable.
fn local_runtime() -> Option<BollardRuntime> {
    let info = detect_local().ok()?;
    BollardRuntime::connect(&info).ok()
}

/// Skip test if no local runtime available.
macro_rules! require_runtime {
    () => {
        match local_runtime() {
            Some(rt) => rt,
            None => {
                eprintln!("Skipping test: no local container runtime found");
                return;
            }
        }
    };
}

async fn ensure_alpine(runtime: &BollardRuntime) {
    let image = ImageRef::parse("alpine:latest").expect("valid image ref");
    if runtime.inspect_image("alpine:latest").await.is_err() {
        runtime
            .pull_image(&image, None)
            .await
            .expect("pull should succeed");
    }
}

/// Create and start a sleeping alpine container.
async fn sleeper(runtime: &BollardRuntime, name: &str) -> ContainerId {
    ensure_alpine(runtime).await;
    let config = ContainerConfig {
        name: name.to_string(),
        run: RunConfig {
            image: "alpine:latest".to_string(),
            cmd: Some(vec!["sleep".to_string(), "300".to_string()]),
            labels: HashMap::from([(TEST_LABEL.to_string(), "true".to_string())]),
            ..Default::default()
        },
        networks: HashMap::from([("bridge".to_string(), EndpointConfig::default())]),
        ..Default::default()
    };
    let id = runtime
        .create_container(&config)
        .await
        .expect("create_container should succeed");
    runtime
        .start_container(&id)
        .await
        .expect("start_container should succeed");
    id
}

async fn cleanup(runtime: &BollardRuntime, name: &str) {
    let _ = runtime
        .remove_container(
            &ContainerId::from(name),
            RemoveOptions {
                force: true,
                remove_volumes: true,
            },
        )
        .await;
}

// =============================================================================
// RuntimeInfo Tests
// =============================================================================

#[tokio::test]
async fn runtime_info() {
    let runtime = require_runtime!();

    let info = runtime.info().await.expect("should get runtime info");

    assert!(
        !info.name.is_empty(),
        "runtime name should not be empty, got: {}",
        info.name
    );
    assert!(
        !info.version.is_empty(),
        "runtime version should not be empty"
    );
    runtime.ping().await.expect("ping should succeed");

    let detected = detect_local().expect("runtime was detected");
    assert_eq!(runtime.runtime_type(), detected.runtime_type);
}

// =============================================================================
// ImageOps Tests
// =============================================================================

#[tokio::test]
async fn inspect_missing_image_is_not_found() {
    let runtime = require_runtime!();

    let err = runtime
        .inspect_image("this-image-definitely-does-not-exist-12345:v999")
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "expected not found, got: {}", err);
}

// =============================================================================
// ContainerOps Tests
// =============================================================================

#[tokio::test]
async fn container_lifecycle() {
    support::init_tracing();
    let runtime = require_runtime!();
    let name = format!("reimage-test-{}", std::process::id());
    cleanup(&runtime, &name).await;

    let id = sleeper(&runtime, &name).await;

    let info = runtime
        .inspect_container(&id)
        .await
        .expect("inspect_container should succeed");
    assert_eq!(info.state, ContainerState::Running);
    assert_eq!(info.name, name);
    assert!(info.networks.contains_key("bridge"));

    let containers = runtime
        .list_containers(&ContainerFilters::default())
        .await
        .expect("list_containers should succeed");
    assert!(containers.iter().any(|c| c.id == id));

    runtime
        .kill_container(&id, "SIGKILL")
        .await
        .expect("kill_container should succeed");
    let everything = runtime
        .list_containers(&ContainerFilters { all: true })
        .await
        .expect("list_containers should succeed");
    assert!(everything.iter().any(|c| c.id == id));
    runtime
        .remove_container(&id, RemoveOptions::default())
        .await
        .expect("remove_container should succeed");

    let err = runtime.inspect_container(&id).await.unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// Replacement Tests
// =============================================================================

#[tokio::test]
async fn replace_keeps_name_and_network() {
    support::init_tracing();
    let runtime = require_runtime!();
    let name = format!("reimage-replace-{}", std::process::id());
    cleanup(&runtime, &name).await;
    let old_id = sleeper(&runtime, &name).await;

    let options = UpdateOptions {
        pull_images: false,
        default_stop_signal: "SIGKILL".to_string(),
        poll_interval: Duration::from_millis(200),
    };
    let client = UpdateClient::new(runtime, options);
    let snapshot = client.get_container(&old_id).await.expect("snapshot");
    assert!(!client.is_container_stale(&snapshot).await.expect("check"));

    client
        .stop_container(&snapshot, Duration::from_secs(10))
        .await
        .expect("stop should succeed");
    let new_id = client
        .start_container(&snapshot)
        .await
        .expect("recreate should succeed");

    let info = client
        .runtime()
        .inspect_container(&new_id)
        .await
        .expect("inspect new container");
    assert_ne!(new_id, old_id);
    assert_eq!(info.name, name);
    assert!(info.is_running());
    assert!(info.networks.contains_key("bridge"));
    assert_eq!(info.config.labels.get(TEST_LABEL).map(String::as_str), Some("true"));

    cleanup(client.runtime(), &name).await;
}

// =============================================================================
// ExecOps Tests
// =============================================================================

#[tokio::test]
async fn exec_reports_output_and_exit_code() {
    let runtime = require_runtime!();
    let name = format!("reimage-exec-{}", std::process::id());
    cleanup(&runtime, &name).await;
    let id = sleeper(&runtime, &name).await;
    let client = UpdateClient::new(runtime, UpdateOptions::default());

    let outcome = client
        .execute_command(&id, "echo hello world", Duration::from_secs(10))
        .await
        .expect("exec should run");
    assert!(outcome.is_success());
    if !outcome.output().is_empty() {
        assert_eq!(outcome.output(), "hello world");
    }

    let outcome = client
        .execute_command(&id, "exit 3", Duration::from_secs(10))
        .await
        .expect("exec should run");
    assert!(matches!(outcome, ExecOutcome::Failed { exit_code: 3, .. }));

    cleanup(client.runtime(), &name).await;
}
