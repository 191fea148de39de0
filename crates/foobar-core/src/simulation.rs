//! The simulation driver: tick clock, factory, random source and pacer.
//!
//! A decision round is `load` followed by `advance(false)`. When the pilot
//! has nothing to do, `advance(true)` moves time forward by at least one
//! tick so busy workers can finish.

use rand::Rng;
use tracing::debug;

use foobar_agents::{Task, TaskError};
use foobar_types::{FactorySnapshot, TaskRequest};

use crate::clock::{ClockError, TickClock};
use crate::config::FactoryConfig;
use crate::factory::{Assignment, Factory, FactoryError};
use crate::pacer::{NoPacing, TickPacer};

/// Errors surfaced by the driver.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// A request could not be turned into a task.
    #[error("invalid task request: {source}")]
    Request {
        /// The underlying validation error.
        #[from]
        source: TaskError,
    },

    /// The factory rejected a batch or broke an invariant.
    #[error(transparent)]
    Factory {
        /// The underlying factory error.
        #[from]
        source: FactoryError,
    },

    /// The tick counter ran out.
    #[error(transparent)]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The factory has no workers, so no worker can ever become ready.
    #[error("factory has no workers")]
    NoWorkers,
}

impl SimulationError {
    /// Whether the simulation is unchanged and the caller may try another
    /// batch.
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Request { source } => matches!(source, TaskError::InvalidParameter { .. }),
            Self::Factory { source } => source.is_recoverable(),
            Self::Clock { .. } | Self::NoWorkers => false,
        }
    }
}

/// Drives a [`Factory`] through time.
pub struct Simulation<R> {
    clock: TickClock,
    factory: Factory,
    rng: R,
    pacer: Box<dyn TickPacer>,
}

impl<R: Rng> Simulation<R> {
    /// Build a simulation at tick 0 from the factory configuration.
    ///
    /// Ticks are not paced; see [`Simulation::with_pacer`].
    pub fn new(config: &FactoryConfig, rng: R) -> Self {
        Self::from_factory(
            Factory::new(config.initial_workers, config.starting_ledger()),
            rng,
        )
    }

    /// Wrap an existing factory, starting at tick 0.
    pub fn from_factory(factory: Factory, rng: R) -> Self {
        Self {
            clock: TickClock::new(),
            factory,
            rng,
            pacer: Box::new(NoPacing),
        }
    }

    /// Replace the pacer.
    #[must_use]
    pub fn with_pacer(mut self, pacer: Box<dyn TickPacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Current tick.
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// The factory being driven.
    pub const fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Build tasks for `requests` and commit them at the current tick.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Request`] for a malformed request, before
    /// the factory is touched, or [`SimulationError::Factory`] if the batch
    /// is rejected.
    pub fn load(&mut self, requests: &[TaskRequest]) -> Result<Vec<Assignment>, SimulationError> {
        let tasks = requests
            .iter()
            .map(|&request| Task::new(request, &mut self.rng))
            .collect::<Result<Vec<_>, _>>()?;
        let assignments = self.factory.commit(self.clock.tick(), tasks)?;
        for assignment in &assignments {
            debug!(
                worker = %assignment.worker,
                kind = %assignment.kind,
                start_tick = assignment.start_tick,
                "task assigned"
            );
        }
        Ok(assignments)
    }

    /// Run the factory until a worker is ready for a new task.
    ///
    /// The current tick is always run once. With `force_one`, time moves
    /// forward by at least one tick even if a worker is already ready.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NoWorkers`] for an empty factory, a
    /// factory error on a broken invariant, or a clock error if the tick
    /// counter overflows.
    pub fn advance(&mut self, force_one: bool) -> Result<FactorySnapshot, SimulationError> {
        if self.factory.worker_count() == 0 {
            return Err(SimulationError::NoWorkers);
        }
        let mut force = force_one;
        loop {
            self.factory.run(self.clock.tick())?;
            if !force && self.factory.ready_count() > 0 {
                break;
            }
            self.pacer.pace();
            self.clock.advance()?;
            force = false;
        }
        Ok(self.snapshot())
    }

    /// Read-only view of the current state. Never advances anything.
    pub fn snapshot(&self) -> FactorySnapshot {
        self.factory.snapshot(self.clock.tick())
    }
}
