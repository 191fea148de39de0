//! Error types for the foobar-agents crate.
//!
//! Task errors split into two families. Validation and resource
//! insufficiency are ordinary rejections a caller can recover from by
//! asking for something else. Status violations and out-of-range ticks
//! mean the lifecycle was driven in the wrong order and indicate a bug in
//! the caller.

use foobar_ledger::LedgerError;
use foobar_types::{TaskKind, TaskRequest, TaskStatus, WorkerStatus};

/// Errors that can occur while building or driving a task.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The request carried a parameter outside its valid range.
    #[error("invalid task request {request}: {reason}")]
    InvalidParameter {
        /// The rejected request.
        request: TaskRequest,
        /// Why the request was rejected.
        reason: String,
    },

    /// The ledger does not hold what the task needs to start.
    #[error("not enough resources for {kind}: {source}")]
    InsufficientResources {
        /// Kind of the task that could not reserve.
        kind: TaskKind,
        /// The underlying ledger shortfall.
        source: LedgerError,
    },

    /// An operation was invoked in the wrong lifecycle state.
    #[error("cannot {operation} {kind} task: status is {actual}, expected {expected}")]
    StatusViolation {
        /// Kind of the task.
        kind: TaskKind,
        /// The operation that was attempted.
        operation: &'static str,
        /// The status the operation requires.
        expected: TaskStatus,
        /// The status the task was actually in.
        actual: TaskStatus,
    },

    /// Progress was requested for a tick before the task started.
    #[error("{kind} task progressed at tick {tick}, before its start tick {start_tick}")]
    TickOutOfRange {
        /// Kind of the task.
        kind: TaskKind,
        /// The tick passed to `progress`.
        tick: u64,
        /// The tick the task started at.
        start_tick: u64,
    },

    /// Delivering the result would corrupt the ledger.
    #[error("ledger rejected {kind} delivery: {source}")]
    Ledger {
        /// Kind of the task.
        kind: TaskKind,
        /// The underlying ledger error.
        source: LedgerError,
    },
}

/// Errors that can occur while driving a worker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    /// A task was scheduled on a worker that is not ready.
    #[error("cannot schedule a task on a busy worker (status: {status})")]
    Busy {
        /// The worker's status at the time of the call.
        status: WorkerStatus,
    },

    /// The worker's task rejected a lifecycle operation.
    #[error("task error: {source}")]
    Task {
        /// The underlying task error.
        #[from]
        source: TaskError,
    },
}
