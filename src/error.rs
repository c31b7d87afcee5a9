// ABOUTME: Application-wide error types for reimage.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::runtime::RuntimeError;
use crate::update::UpdateError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("command exited with code {0}")]
    CommandFailed(i64),

    #[error("{failed} of {scanned} containers failed to update")]
    SessionFailed { failed: usize, scanned: usize },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
