//! Workers (robots): one task at a time, with a penalty for switching.
//!
//! A [`Worker`] moves through three states:
//!
//! ```text
//! Ready --schedule--> Scheduling --start tick reached--> Working --task done--> Ready
//! ```
//!
//! A worker remembers the last task it finished. When the next task is of
//! a different kind, its start is pushed back by [`SWITCH_PENALTY_TICKS`].

use tracing::debug;

use foobar_types::{TaskKind, TaskStatus, WorkerId, WorkerStatus, WorkerView};

use crate::error::{TaskError, WorkerError};
use crate::task::Task;

/// Ticks lost when a worker changes the kind of task it performs.
pub const SWITCH_PENALTY_TICKS: u64 = 5;

/// A worker that executes tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Worker {
    /// Current state.
    status: WorkerStatus,
    /// Task being scheduled or worked on.
    current_task: Option<Task>,
    /// Last completed task, kept for kind matching.
    previous_task: Option<Task>,
    /// Tick the current task starts at; unset while ready.
    scheduled_start_tick: Option<u64>,
}

impl Worker {
    /// Create an idle worker with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub const fn status(&self) -> WorkerStatus {
        self.status
    }

    /// Whether the worker can accept a task.
    pub const fn is_ready(&self) -> bool {
        matches!(self.status, WorkerStatus::Ready)
    }

    /// Task being scheduled or worked on.
    pub const fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    /// Last completed task.
    pub const fn previous_task(&self) -> Option<&Task> {
        self.previous_task.as_ref()
    }

    /// Kind of the last completed task, `None` for a worker with no history.
    pub fn previous_kind(&self) -> Option<TaskKind> {
        self.previous_task.as_ref().map(Task::kind)
    }

    /// Tick the current task starts at.
    pub const fn scheduled_start_tick(&self) -> Option<u64> {
        self.scheduled_start_tick
    }

    /// Tick at which a task of `kind` requested at `tick` would start on
    /// this worker.
    pub fn start_tick_for(&self, kind: TaskKind, tick: u64) -> u64 {
        match self.previous_kind() {
            Some(previous) if previous != kind => tick.saturating_add(SWITCH_PENALTY_TICKS),
            _ => tick,
        }
    }

    /// Accept `task`, requested at `tick`. Returns the tick it will start.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Busy`] unless the worker is ready, or a task
    /// status violation if `task` is not `Ready`.
    pub fn schedule(&mut self, task: Task, tick: u64) -> Result<u64, WorkerError> {
        if !self.is_ready() {
            return Err(WorkerError::Busy {
                status: self.status,
            });
        }
        if task.status() != TaskStatus::Ready {
            return Err(TaskError::StatusViolation {
                kind: task.kind(),
                operation: "schedule",
                expected: TaskStatus::Ready,
                actual: task.status(),
            }
            .into());
        }
        let start_tick = self.start_tick_for(task.kind(), tick);
        debug!(
            kind = %task.kind(),
            previous = ?self.previous_kind(),
            tick,
            start_tick,
            "worker scheduled"
        );
        self.scheduled_start_tick = Some(start_tick);
        self.current_task = Some(task);
        self.status = WorkerStatus::Scheduling;
        Ok(start_tick)
    }

    /// Advance the worker to `tick`.
    ///
    /// A scheduled task whose start tick has been reached is started and
    /// progressed in the same call. When the current task completes it
    /// becomes the worker's previous task, the worker turns ready again,
    /// and a mutable borrow of the finished task is returned so the caller
    /// can deliver its result. Each task is returned exactly once.
    ///
    /// # Errors
    ///
    /// Propagates task lifecycle errors as [`WorkerError::Task`].
    pub fn advance(&mut self, tick: u64) -> Result<Option<&mut Task>, WorkerError> {
        let Some(task) = self.current_task.as_mut() else {
            return Ok(None);
        };

        if self.status == WorkerStatus::Scheduling {
            let start_tick = self.scheduled_start_tick.unwrap_or(tick);
            if tick >= start_tick {
                task.start(tick);
                self.status = WorkerStatus::Working;
            }
        }

        if self.status != WorkerStatus::Working {
            return Ok(None);
        }

        task.progress(tick)?;
        if task.status() != TaskStatus::Completed {
            return Ok(None);
        }

        self.previous_task = self.current_task.take();
        self.scheduled_start_tick = None;
        self.status = WorkerStatus::Ready;
        Ok(self.previous_task.as_mut())
    }

    /// Read-only view for snapshots.
    pub fn view(&self, id: WorkerId) -> WorkerView {
        WorkerView {
            id,
            status: self.status,
            scheduled_start_tick: self.scheduled_start_tick,
            current_task: self.current_task.as_ref().map(Task::view),
            previous_task: self.previous_task.as_ref().map(Task::view),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use foobar_ledger::ResourceLedger;
    use foobar_types::{Resource, TaskRequest};
    use rust_decimal::Decimal;

    use super::*;

    fn task(request: TaskRequest, duration: i64) -> Task {
        Task::from_parts(request, Decimal::new(duration, 0), 1).unwrap()
    }

    /// A worker whose last finished task was of `request`'s kind.
    fn worker_after(request: TaskRequest) -> Worker {
        let mut worker = Worker::new();
        worker.schedule(task(request, 0), 0).unwrap();
        assert!(worker.advance(0).unwrap().is_some());
        worker
    }

    #[test]
    fn new_worker_is_ready_and_empty() {
        let worker = Worker::new();
        assert!(worker.is_ready());
        assert!(worker.current_task().is_none());
        assert!(worker.previous_task().is_none());
        assert_eq!(worker.scheduled_start_tick(), None);
    }

    #[test]
    fn first_task_starts_immediately() {
        let mut worker = Worker::new();
        let start = worker.schedule(task(TaskRequest::MineFoo, 1), 3).unwrap();
        assert_eq!(start, 3);
        assert_eq!(worker.status(), WorkerStatus::Scheduling);
    }

    #[test]
    fn same_kind_pays_no_penalty() {
        let mut worker = worker_after(TaskRequest::MineFoo);
        let start = worker.schedule(task(TaskRequest::MineFoo, 1), 10).unwrap();
        assert_eq!(start, 10);
    }

    #[test]
    fn switching_kind_pays_five_ticks() {
        let mut worker = worker_after(TaskRequest::MineBar);
        let start = worker.schedule(task(TaskRequest::MineFoo, 1), 10).unwrap();
        assert_eq!(start, 15);
        assert_eq!(worker.scheduled_start_tick(), Some(15));
    }

    #[test]
    fn sell_counts_do_not_change_the_kind() {
        let mut worker = worker_after(TaskRequest::SellFoobar { count: 1 });
        let request = TaskRequest::SellFoobar { count: 5 };
        let sell = Task::from_parts(request, Decimal::TEN, 5).unwrap();
        assert_eq!(worker.schedule(sell, 4).unwrap(), 4);
    }

    #[test]
    fn scheduling_a_busy_worker_fails() {
        let mut worker = Worker::new();
        worker.schedule(task(TaskRequest::MineFoo, 1), 0).unwrap();
        let err = worker.schedule(task(TaskRequest::MineFoo, 1), 0).unwrap_err();
        assert_eq!(
            err,
            WorkerError::Busy {
                status: WorkerStatus::Scheduling
            }
        );
    }

    #[test]
    fn scheduling_a_started_task_fails() {
        let mut worker = Worker::new();
        let mut started = task(TaskRequest::MineFoo, 1);
        started.start(0);
        assert!(matches!(
            worker.schedule(started, 0),
            Err(WorkerError::Task { .. })
        ));
        assert!(worker.is_ready());
    }

    #[test]
    fn advance_without_task_returns_nothing() {
        let mut worker = Worker::new();
        assert!(worker.advance(0).unwrap().is_none());
    }

    #[test]
    fn waits_out_the_switch_penalty() {
        let mut worker = worker_after(TaskRequest::MineBar);
        worker.schedule(task(TaskRequest::MineFoo, 1), 10).unwrap();
        for tick in 10..15 {
            assert!(worker.advance(tick).unwrap().is_none());
            assert_eq!(worker.status(), WorkerStatus::Scheduling);
        }
        assert!(worker.advance(15).unwrap().is_none());
        assert_eq!(worker.status(), WorkerStatus::Working);
        let done = worker.advance(16).unwrap().unwrap();
        assert_eq!(done.start_tick(), Some(15));
        assert!(worker.is_ready());
    }

    #[test]
    fn zero_duration_task_completes_on_its_start_tick() {
        let mut worker = Worker::new();
        worker.schedule(task(TaskRequest::BuyRobot, 0), 4).unwrap();
        let done = worker.advance(4).unwrap().unwrap();
        assert_eq!(done.kind(), TaskKind::BuyRobot);
        assert!(worker.is_ready());
    }

    #[test]
    fn completed_task_is_returned_once() {
        let mut worker = Worker::new();
        worker.schedule(task(TaskRequest::MineFoo, 1), 0).unwrap();
        assert!(worker.advance(0).unwrap().is_none());
        assert!(worker.advance(1).unwrap().is_some());
        assert!(worker.advance(1).unwrap().is_none());
        assert!(worker.advance(2).unwrap().is_none());
    }

    #[test]
    fn ready_worker_never_holds_a_current_task() {
        let mut worker = Worker::new();
        worker.schedule(task(TaskRequest::AssembleFoobar, 2), 0).unwrap();
        for tick in 0..5 {
            worker.advance(tick).unwrap();
            if worker.is_ready() {
                assert!(worker.current_task().is_none());
            } else {
                assert!(worker.current_task().is_some());
            }
        }
        assert!(worker.is_ready());
    }

    #[test]
    fn completion_clears_the_start_tick() {
        let mut worker = worker_after(TaskRequest::MineBar);
        worker.schedule(task(TaskRequest::MineFoo, 1), 2).unwrap();
        assert_eq!(worker.scheduled_start_tick(), Some(7));
        worker.advance(7).unwrap();
        assert!(worker.advance(8).unwrap().is_some());
        assert!(worker.is_ready());
        assert_eq!(worker.scheduled_start_tick(), None);
        assert_eq!(worker.view(WorkerId(0)).scheduled_start_tick, None);
    }

    #[test]
    fn delivered_task_is_recorded_as_consumed() {
        let mut worker = Worker::new();
        worker.schedule(task(TaskRequest::MineFoo, 1), 0).unwrap();
        worker.advance(0).unwrap();
        let done = worker.advance(1).unwrap().unwrap();
        let delivery = done.deliver_result(&ResourceLedger::new()).unwrap();
        assert_eq!(delivery.ledger.get(Resource::Foo), 1);
        let previous = worker.previous_task().unwrap();
        assert_eq!(previous.status(), TaskStatus::Consumed);
        assert_eq!(worker.previous_kind(), Some(TaskKind::MineFoo));
    }

    #[test]
    fn view_reflects_state() {
        let mut worker = Worker::new();
        worker.schedule(task(TaskRequest::MineBar, 2), 1).unwrap();
        let view = worker.view(WorkerId(3));
        assert_eq!(view.id, WorkerId(3));
        assert_eq!(view.status, WorkerStatus::Scheduling);
        assert_eq!(view.scheduled_start_tick, Some(1));
        assert_eq!(view.current_task.map(|t| t.kind), Some(TaskKind::MineBar));
        assert!(view.previous_task.is_none());
    }
}
