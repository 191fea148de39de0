//! The allocator: owns the workers and the ledger, assigns batches of tasks
//! and advances every worker one tick at a time.
//!
//! # Batch assignment
//!
//! [`Factory::commit`] is all-or-nothing. Resources for the whole batch are
//! reserved against a staged copy of the ledger and workers are picked from
//! a pool of ready ones before anything is written back. Any rejection
//! leaves the ledger and every worker exactly as they were.
//!
//! Workers are picked to avoid the switch penalty: a worker whose last task
//! had the same kind first, then a worker that has never worked, then any
//! remaining ready worker. Tasks whose kind some ready worker has just done
//! are placed first so they get first pick.
//!
//! # Tick advancement
//!
//! [`Factory::run`] advances every worker in creation order and delivers
//! each completed task into the ledger. Robots bought during a pass join the
//! arena after it, so they never work in the tick they were created.

use std::collections::BTreeSet;

use tracing::{debug, info};

use foobar_agents::{Task, TaskError, Worker, WorkerError};
use foobar_ledger::ResourceLedger;
use foobar_types::{FactorySnapshot, Resource, TaskKind, WorkerId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by the allocator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    /// The batch holds more tasks than there are ready workers.
    #[error("not enough ready workers: {requested} task(s) requested, {ready} worker(s) ready")]
    NotEnoughWorkers {
        /// Number of tasks in the batch.
        requested: usize,
        /// Number of ready workers.
        ready: usize,
    },

    /// The ledger cannot cover the batch.
    #[error("cannot reserve resources for {kind}: {source}")]
    InsufficientResources {
        /// Kind of the first task that could not be covered.
        kind: TaskKind,
        /// The underlying reservation error.
        source: TaskError,
    },

    /// A task was in the wrong state during commit.
    #[error("task {kind} rejected during commit: {source}")]
    Task {
        /// Kind of the offending task.
        kind: TaskKind,
        /// The underlying task error.
        source: TaskError,
    },

    /// A worker refused an operation it should have accepted.
    #[error("worker {id} failed: {source}")]
    Worker {
        /// The worker concerned.
        id: WorkerId,
        /// The underlying worker error.
        source: WorkerError,
    },

    /// A completed task could not be delivered into the ledger.
    #[error("delivery from worker {id} failed: {source}")]
    Delivery {
        /// The worker whose task completed.
        id: WorkerId,
        /// The underlying task error.
        source: TaskError,
    },

    /// A handle does not point into the worker arena.
    #[error("unknown worker {id}")]
    UnknownWorker {
        /// The dangling handle.
        id: WorkerId,
    },
}

impl FactoryError {
    /// Whether the error is a plain rejection of a batch.
    ///
    /// Recoverable errors leave the factory untouched, so the caller may
    /// retry with a different batch. Anything else is a broken invariant.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotEnoughWorkers { .. } | Self::InsufficientResources { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// One task handed to one worker by [`Factory::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// The worker that accepted the task.
    pub worker: WorkerId,
    /// Kind of the task.
    pub kind: TaskKind,
    /// Tick at which the task starts.
    pub start_tick: u64,
}

/// One task delivered during [`Factory::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// The worker that finished the task.
    pub worker: WorkerId,
    /// Kind of the task.
    pub kind: TaskKind,
    /// The task's result.
    pub result: u32,
}

/// What happened during one [`Factory::run`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Tasks delivered this pass, in worker order.
    pub completed: Vec<Completion>,
    /// Workers added to the arena at the end of the pass.
    pub hired: Vec<WorkerId>,
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Owner of the worker arena and the resource ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factory {
    /// Append-only worker arena, indexed by [`WorkerId`].
    workers: Vec<Worker>,
    /// Current resources.
    ledger: ResourceLedger,
}

impl Factory {
    /// Create a factory with `initial_workers` idle workers and the given
    /// starting resources.
    pub fn new(initial_workers: u32, ledger: ResourceLedger) -> Self {
        let workers = (0..initial_workers).map(|_| Worker::new()).collect();
        Self { workers, ledger }
    }

    /// Current resources.
    pub const fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// All workers, in creation order.
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Look a worker up by handle.
    pub fn worker(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.get(id.index())
    }

    /// Total number of workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of workers able to take a task.
    pub fn ready_count(&self) -> usize {
        self.workers.iter().filter(|w| w.is_ready()).count()
    }

    /// Validate `tasks` against the ledger and the ready workers, then
    /// assign all of them at `tick`.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::NotEnoughWorkers`] or
    /// [`FactoryError::InsufficientResources`] when the batch is rejected;
    /// nothing is modified in that case. Other variants signal a broken
    /// invariant.
    pub fn commit(
        &mut self,
        tick: u64,
        mut tasks: Vec<Task>,
    ) -> Result<Vec<Assignment>, FactoryError> {
        let mut pool: Vec<(WorkerId, Option<TaskKind>)> = self
            .workers
            .iter()
            .enumerate()
            .filter(|(_, worker)| worker.is_ready())
            .map(|(index, worker)| (WorkerId(index), worker.previous_kind()))
            .collect();

        if tasks.len() > pool.len() {
            return Err(FactoryError::NotEnoughWorkers {
                requested: tasks.len(),
                ready: pool.len(),
            });
        }

        let recent: BTreeSet<TaskKind> = pool.iter().filter_map(|&(_, kind)| kind).collect();
        tasks.sort_by_key(|task| !recent.contains(&task.kind()));

        let mut staged = self.ledger.clone();
        let mut plan = Vec::with_capacity(tasks.len());
        for task in tasks {
            let kind = task.kind();
            staged = task
                .reserve_resources(&staged)
                .map_err(|source| match source {
                    TaskError::InsufficientResources { .. } => {
                        FactoryError::InsufficientResources { kind, source }
                    }
                    other => FactoryError::Task {
                        kind,
                        source: other,
                    },
                })?;
            let position = pick_worker(&pool, kind).ok_or(FactoryError::NotEnoughWorkers {
                requested: plan.len().saturating_add(1),
                ready: plan.len(),
            })?;
            let (id, _) = pool.remove(position);
            plan.push((id, task));
        }

        self.ledger = staged;

        let mut assignments = Vec::with_capacity(plan.len());
        for (id, task) in plan {
            let kind = task.kind();
            let worker = self
                .workers
                .get_mut(id.index())
                .ok_or(FactoryError::UnknownWorker { id })?;
            let start_tick = worker
                .schedule(task, tick)
                .map_err(|source| FactoryError::Worker { id, source })?;
            assignments.push(Assignment {
                worker: id,
                kind,
                start_tick,
            });
        }

        info!(
            tick,
            tasks = assignments.len(),
            foo = self.ledger.get(Resource::Foo),
            bar = self.ledger.get(Resource::Bar),
            foobar = self.ledger.get(Resource::Foobar),
            money = self.ledger.get(Resource::Money),
            "batch committed"
        );
        Ok(assignments)
    }

    /// Advance every worker to `tick` and deliver whatever completed.
    ///
    /// # Errors
    ///
    /// Any error here is a broken invariant: a task in the wrong state, a
    /// tick earlier than a task's start, or a ledger overflow.
    pub fn run(&mut self, tick: u64) -> Result<RunReport, FactoryError> {
        let mut report = RunReport::default();
        let mut to_hire: u32 = 0;

        for (index, worker) in self.workers.iter_mut().enumerate() {
            let id = WorkerId(index);
            let finished = worker
                .advance(tick)
                .map_err(|source| FactoryError::Worker { id, source })?;
            let Some(task) = finished else {
                continue;
            };
            let kind = task.kind();
            let delivery = task
                .deliver_result(&self.ledger)
                .map_err(|source| FactoryError::Delivery { id, source })?;
            let result = task
                .result()
                .map_err(|source| FactoryError::Delivery { id, source })?;
            self.ledger = delivery.ledger;
            to_hire = to_hire.saturating_add(delivery.new_workers);
            debug!(tick, worker = %id, %kind, result, "task delivered");
            report.completed.push(Completion {
                worker: id,
                kind,
                result,
            });
        }

        for _ in 0..to_hire {
            let id = WorkerId(self.workers.len());
            self.workers.push(Worker::new());
            report.hired.push(id);
        }
        if !report.hired.is_empty() {
            info!(
                tick,
                hired = report.hired.len(),
                workers = self.workers.len(),
                "new robots joined the factory"
            );
        }

        Ok(report)
    }

    /// Read-only view of the factory at `tick`.
    pub fn snapshot(&self, tick: u64) -> FactorySnapshot {
        FactorySnapshot {
            tick,
            resources: self.ledger.balances().clone(),
            workers: self
                .workers
                .iter()
                .enumerate()
                .map(|(index, worker)| worker.view(WorkerId(index)))
                .collect(),
        }
    }
}

/// Position in `pool` of the best worker for a task of `kind`.
fn pick_worker(pool: &[(WorkerId, Option<TaskKind>)], kind: TaskKind) -> Option<usize> {
    pool.iter()
        .position(|&(_, previous)| previous == Some(kind))
        .or_else(|| pool.iter().position(|&(_, previous)| previous.is_none()))
        .or_else(|| (!pool.is_empty()).then_some(0))
}
