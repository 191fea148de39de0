//! Stable handles into the factory's worker arena.
//!
//! Workers are never removed, so the index a worker receives at creation
//! identifies it for the whole run.

use serde::{Deserialize, Serialize};

/// Index of a worker in creation order (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub usize);

impl WorkerId {
    /// Return the arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "robot-{}", self.0)
    }
}

impl From<usize> for WorkerId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}
