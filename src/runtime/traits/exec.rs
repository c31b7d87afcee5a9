// ABOUTME: Exec operations trait for container runtimes.
// ABOUTME: Create, start, and inspect exec sessions inside running containers.

use super::shared_types::{ExecConfig, ExecInfo, ExecStart};
use crate::types::{ContainerId, ExecId};
use async_trait::async_trait;

/// Exec operations: run commands in containers.
#[async_trait]
pub trait ExecOps: Send + Sync {
    /// Create an exec instance without starting it.
    async fn exec_create(
        &self,
        container: &ContainerId,
        config: &ExecConfig,
    ) -> Result<ExecId, ExecError>;

    /// Start a created exec instance.
    ///
    /// With `detach == false` the returned value carries the output stream.
    /// Runtimes that cannot stream exec output may start detached instead.
    async fn exec_start(&self, exec_id: &ExecId, detach: bool) -> Result<ExecStart, ExecError>;

    /// Inspect an exec instance.
    async fn exec_inspect(&self, exec_id: &ExecId) -> Result<ExecInfo, ExecError>;
}

/// Errors from exec operations.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("container not running: {0}")]
    ContainerNotRunning(String),

    #[error("exec instance not found: {0}")]
    ExecNotFound(String),

    #[error("failed to attach to exec output: {0}")]
    AttachFailed(String),

    #[error("exec failed: {0}")]
    Failed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
