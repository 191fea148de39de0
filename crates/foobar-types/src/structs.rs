//! Read-only views of simulation state.
//!
//! These are the structures pilots and the terminal front-end consume.
//! They are plain data: building one never advances the simulation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{Resource, TaskKind, TaskStatus, WorkerStatus};
use crate::ids::WorkerId;
use crate::requests::TaskRequest;

/// Snapshot of a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    /// The request the task was built from (kind plus parameters).
    pub request: TaskRequest,
    /// Kind of work, repeated for convenience.
    pub kind: TaskKind,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Duration in ticks, possibly fractional.
    pub duration: Decimal,
    /// Tick at which the task started, if it has.
    pub start_tick: Option<u64>,
    /// Result quantity, visible only once the task has completed.
    pub result: Option<u32>,
}

/// Snapshot of a single worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerView {
    /// Arena handle of the worker.
    pub id: WorkerId,
    /// Worker status.
    pub status: WorkerStatus,
    /// Tick at which the current task starts (or started); `None` while ready.
    pub scheduled_start_tick: Option<u64>,
    /// Task being scheduled or worked on.
    pub current_task: Option<TaskView>,
    /// Last completed task.
    pub previous_task: Option<TaskView>,
}

/// Snapshot of the whole factory at a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorySnapshot {
    /// Current tick.
    pub tick: u64,
    /// Quantity of every resource (all four keys always present).
    pub resources: BTreeMap<Resource, u32>,
    /// All workers, in creation order.
    pub workers: Vec<WorkerView>,
}

impl FactorySnapshot {
    /// Quantity of `resource`, zero if absent.
    pub fn resource(&self, resource: Resource) -> u32 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    /// Total number of workers.
    pub const fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of workers able to accept a task right now.
    pub fn ready_workers(&self) -> usize {
        self.workers
            .iter()
            .filter(|w| w.status == WorkerStatus::Ready)
            .count()
    }
}
