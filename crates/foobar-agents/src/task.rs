//! Tasks: units of work with a sampled duration and outcome.
//!
//! A [`Task`] is built from a [`TaskRequest`]. Any randomness (the mining
//! time of a bar, whether an assembly succeeds) is drawn exactly once, at
//! construction, from the caller's random source and then stored as plain
//! data. Nothing is re-sampled later.
//!
//! # Lifecycle
//!
//! ```text
//! Ready --start--> Running --progress--> Completed --deliver--> Consumed
//! ```
//!
//! Resources are reserved while the task is `Ready` and delivered once it
//! is `Completed`. Both operations are functional: they take the current
//! [`ResourceLedger`] by reference and hand back the updated one.
//!
//! # Per-kind rules
//!
//! | Kind | Duration | Reserve | Result | Deliver |
//! |------|----------|---------|--------|---------|
//! | `MineFoo` | 1 | -- | 1 | +1 foo |
//! | `MineBar` | 0.5, 1, 1.5 or 2 | -- | 1 | +1 bar |
//! | `AssembleFoobar` | 2 | -1 foo, -1 bar | 1 (60%) or 0 | +1 foobar, or +1 bar back |
//! | `SellFoobar(n)` | 10 | -n foobar | n | +n money |
//! | `BuyRobot` | 0 | -3 money, -6 foo | 1 | one new worker |

use rand::Rng;
use rust_decimal::Decimal;
use tracing::debug;

use foobar_ledger::{LedgerError, ResourceLedger};
use foobar_types::{
    MAX_SELL_COUNT, MIN_SELL_COUNT, Resource, TaskKind, TaskRequest, TaskStatus, TaskView,
};

use crate::error::TaskError;

/// Probability that an assembly produces a foobar.
pub const ASSEMBLE_SUCCESS_PROBABILITY: f64 = 0.6;

/// Money spent to buy one robot.
pub const ROBOT_PRICE_MONEY: u32 = 3;

/// Foo spent to buy one robot.
pub const ROBOT_PRICE_FOO: u32 = 6;

/// Ticks needed to mine one foo.
const MINE_FOO_TICKS: i64 = 1;

/// Ticks needed to assemble one foobar.
const ASSEMBLE_TICKS: i64 = 2;

/// Ticks needed to sell a batch of foobars.
const SELL_TICKS: i64 = 10;

/// Largest number of half-ticks a bar can take to mine (2.0 ticks).
const MINE_BAR_MAX_HALF_TICKS: i64 = 4;

/// What a completed task hands back to the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The ledger after the task's credit.
    pub ledger: ResourceLedger,
    /// Number of workers the factory must add.
    pub new_workers: u32,
}

/// A unit of work assigned to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// The request this task was built from.
    request: TaskRequest,
    /// Lifecycle status.
    status: TaskStatus,
    /// Ticks the task needs once started.
    duration: Decimal,
    /// Tick the task started at; unset while `Ready`.
    start_tick: Option<u64>,
    /// Outcome, fixed at construction.
    result: u32,
}

impl Task {
    /// Build a task from a request, sampling its duration and outcome
    /// from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidParameter`] if a sell request asks for
    /// fewer than 1 or more than 5 foobars. Nothing is drawn from `rng` in
    /// that case.
    pub fn new<R: Rng + ?Sized>(request: TaskRequest, rng: &mut R) -> Result<Self, TaskError> {
        validate(request)?;
        let (duration, result) = match request {
            TaskRequest::MineFoo => (Decimal::new(MINE_FOO_TICKS, 0), 1),
            TaskRequest::MineBar => {
                let half_ticks = rng.random_range(1..=MINE_BAR_MAX_HALF_TICKS);
                (Decimal::new(half_ticks.saturating_mul(5), 1), 1)
            }
            TaskRequest::AssembleFoobar => (
                Decimal::new(ASSEMBLE_TICKS, 0),
                u32::from(rng.random_bool(ASSEMBLE_SUCCESS_PROBABILITY)),
            ),
            TaskRequest::SellFoobar { count } => (Decimal::new(SELL_TICKS, 0), count),
            TaskRequest::BuyRobot => (Decimal::ZERO, 1),
        };
        Ok(Self::ready(request, duration, result))
    }

    /// Build a task with an explicit duration and outcome.
    ///
    /// Used to replay a known run and to pin random outcomes in tests.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidParameter`] for an out-of-range sell
    /// count, a negative duration, or a result the request cannot produce.
    pub fn from_parts(
        request: TaskRequest,
        duration: Decimal,
        result: u32,
    ) -> Result<Self, TaskError> {
        validate(request)?;
        if duration.is_sign_negative() {
            return Err(TaskError::InvalidParameter {
                request,
                reason: format!("duration must not be negative, got {duration}"),
            });
        }
        let allowed = match request {
            TaskRequest::MineFoo | TaskRequest::MineBar | TaskRequest::BuyRobot => result == 1,
            TaskRequest::AssembleFoobar => result <= 1,
            TaskRequest::SellFoobar { count } => result == count,
        };
        if !allowed {
            return Err(TaskError::InvalidParameter {
                request,
                reason: format!("result {result} is impossible for {}", request.kind()),
            });
        }
        Ok(Self::ready(request, duration, result))
    }

    const fn ready(request: TaskRequest, duration: Decimal, result: u32) -> Self {
        Self {
            request,
            status: TaskStatus::Ready,
            duration,
            start_tick: None,
            result,
        }
    }

    /// The request this task was built from.
    pub const fn request(&self) -> TaskRequest {
        self.request
    }

    /// Kind of work.
    pub const fn kind(&self) -> TaskKind {
        self.request.kind()
    }

    /// Lifecycle status.
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Ticks needed once started.
    pub const fn duration(&self) -> Decimal {
        self.duration
    }

    /// Tick the task started at, if it has.
    pub const fn start_tick(&self) -> Option<u64> {
        self.start_tick
    }

    /// Start the task at `tick`. Does nothing unless the task is `Ready`.
    pub const fn start(&mut self, tick: u64) {
        if matches!(self.status, TaskStatus::Ready) {
            self.start_tick = Some(tick);
            self.status = TaskStatus::Running;
        }
    }

    /// Advance the task to `tick`, completing it once its duration has
    /// elapsed since the start tick.
    ///
    /// Progressing a task that has already completed is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TickOutOfRange`] if `tick` is before the start
    /// tick, or [`TaskError::StatusViolation`] if the task was never
    /// started or has been consumed.
    pub fn progress(&mut self, tick: u64) -> Result<(), TaskError> {
        match self.status {
            TaskStatus::Completed => return Ok(()),
            TaskStatus::Running => {}
            TaskStatus::Ready | TaskStatus::Consumed => {
                return Err(self.status_violation("progress", TaskStatus::Running));
            }
        }
        let start_tick = self
            .start_tick
            .ok_or_else(|| self.status_violation("progress", TaskStatus::Running))?;
        let elapsed = tick.checked_sub(start_tick).ok_or(TaskError::TickOutOfRange {
            kind: self.kind(),
            tick,
            start_tick,
        })?;
        if Decimal::from(elapsed) >= self.duration {
            self.status = TaskStatus::Completed;
            debug!(kind = %self.kind(), start_tick, tick, "task completed");
        }
        Ok(())
    }

    /// The outcome of the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::StatusViolation`] until the task has completed.
    pub fn result(&self) -> Result<u32, TaskError> {
        match self.status {
            TaskStatus::Completed | TaskStatus::Consumed => Ok(self.result),
            TaskStatus::Ready | TaskStatus::Running => {
                Err(self.status_violation("read result of", TaskStatus::Completed))
            }
        }
    }

    /// Debit the resources this task needs from a copy of `ledger`.
    ///
    /// The task itself is not modified; the caller decides whether to keep
    /// the returned ledger.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::StatusViolation`] unless the task is `Ready`,
    /// or [`TaskError::InsufficientResources`] if the ledger falls short.
    pub fn reserve_resources(&self, ledger: &ResourceLedger) -> Result<ResourceLedger, TaskError> {
        if self.status != TaskStatus::Ready {
            return Err(self.status_violation("reserve resources for", TaskStatus::Ready));
        }
        let kind = self.kind();
        let short = |source: LedgerError| TaskError::InsufficientResources { kind, source };
        let staged = ledger.clone();
        match self.request {
            TaskRequest::MineFoo | TaskRequest::MineBar => Ok(staged),
            TaskRequest::AssembleFoobar => staged
                .debit(Resource::Foo, 1)
                .and_then(|l| l.debit(Resource::Bar, 1))
                .map_err(short),
            TaskRequest::SellFoobar { count } => {
                staged.debit(Resource::Foobar, count).map_err(short)
            }
            TaskRequest::BuyRobot => staged
                .debit(Resource::Money, ROBOT_PRICE_MONEY)
                .and_then(|l| l.debit(Resource::Foo, ROBOT_PRICE_FOO))
                .map_err(short),
        }
    }

    /// Credit this task's result to a copy of `ledger` and mark the task
    /// consumed.
    ///
    /// A failed assembly returns its bar to the ledger; its foo is lost.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::StatusViolation`] unless the task is
    /// `Completed`, or [`TaskError::Ledger`] if a credit would overflow.
    pub fn deliver_result(&mut self, ledger: &ResourceLedger) -> Result<Delivery, TaskError> {
        if self.status != TaskStatus::Completed {
            return Err(self.status_violation("deliver", TaskStatus::Completed));
        }
        let kind = self.kind();
        let overflow = |source: LedgerError| TaskError::Ledger { kind, source };
        let staged = ledger.clone();
        let mut new_workers = 0;
        let ledger = match self.request {
            TaskRequest::MineFoo => staged.credit(Resource::Foo, self.result),
            TaskRequest::MineBar => staged.credit(Resource::Bar, self.result),
            TaskRequest::AssembleFoobar => {
                if self.result == 0 {
                    staged.credit(Resource::Bar, 1)
                } else {
                    staged.credit(Resource::Foobar, self.result)
                }
            }
            TaskRequest::SellFoobar { .. } => staged.credit(Resource::Money, self.result),
            TaskRequest::BuyRobot => {
                new_workers = self.result;
                Ok(staged)
            }
        }
        .map_err(overflow)?;

        self.status = TaskStatus::Consumed;
        debug!(%kind, result = self.result, new_workers, "task delivered");
        Ok(Delivery {
            ledger,
            new_workers,
        })
    }

    /// Read-only view for snapshots.
    pub fn view(&self) -> TaskView {
        TaskView {
            request: self.request,
            kind: self.kind(),
            status: self.status,
            duration: self.duration,
            start_tick: self.start_tick,
            result: self.result().ok(),
        }
    }

    fn status_violation(&self, operation: &'static str, expected: TaskStatus) -> TaskError {
        TaskError::StatusViolation {
            kind: self.kind(),
            operation,
            expected,
            actual: self.status,
        }
    }
}

/// Reject requests whose parameters are out of range.
fn validate(request: TaskRequest) -> Result<(), TaskError> {
    if let TaskRequest::SellFoobar { count } = request {
        if !(MIN_SELL_COUNT..=MAX_SELL_COUNT).contains(&count) {
            return Err(TaskError::InvalidParameter {
                request,
                reason: format!(
                    "sell count must be between {MIN_SELL_COUNT} and {MAX_SELL_COUNT}, got {count}"
                ),
            });
        }
    }
    Ok(())
}
