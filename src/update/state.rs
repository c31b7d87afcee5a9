// ABOUTME: Replacement state marker types for the type state pattern.
// ABOUTME: Each state carries the data the next step needs.

use crate::types::{ContainerId, ImageId};

/// Initial state: a snapshot taken, nothing checked yet.
/// Available actions: `check()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Snapshotted;

/// Already on the latest image. Terminal.
#[derive(Debug, Clone)]
pub struct Fresh {
    pub(crate) latest: ImageId,
}

/// A newer image exists.
/// Available actions: `remove()`
#[derive(Debug, Clone)]
pub struct Stale {
    pub(crate) latest: ImageId,
}

/// Old container stopped and confirmed gone.
/// Available actions: `recreate()`
#[derive(Debug, Clone)]
pub struct Removed {
    pub(crate) latest: ImageId,
}

/// Replacement created, networked, and started. Terminal.
#[derive(Debug, Clone)]
pub struct Recreated {
    pub(crate) latest: ImageId,
    pub(crate) new_container: ContainerId,
}
