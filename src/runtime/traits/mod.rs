// ABOUTME: Composable capability traits for container runtimes.
// ABOUTME: Defines ContainerOps, ImageOps, NetworkOps, ExecOps, RuntimeInfo.

mod container;
mod exec;
mod image;
mod network;
mod runtime_info;
mod shared_types;

pub use container::{
    ContainerError, ContainerFilters, ContainerOps, ContainerSummary, RemoveOptions,
};
pub use exec::{ExecError, ExecOps};
pub use image::{ImageError, ImageOps};
pub use network::{NetworkError, NetworkOps};
pub use runtime_info::{RuntimeInfo, RuntimeInfoError};
pub use shared_types::*;

/// Every capability the replacement protocol needs from a daemon.
pub trait FullRuntime: ContainerOps + ImageOps + NetworkOps + ExecOps {}

impl<T: ContainerOps + ImageOps + NetworkOps + ExecOps> FullRuntime for T {}
