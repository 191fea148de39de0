//! The round loop: ask the pilot, load its batch, advance, repeat.
//!
//! [`run_until_target`] stops once the factory owns the target number of
//! workers or the tick bound is reached. A batch the factory rejects is
//! logged and followed by a forced tick, so a confused pilot cannot stall
//! the run. Broken invariants end the run with an error.

use rand::Rng;
use tracing::{info, warn};

use foobar_types::FactorySnapshot;

use crate::config::SimulationBoundsConfig;
use crate::pilot::{Pilot, PilotError};
use crate::simulation::{Simulation, SimulationError};

/// Errors that end a run early.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The pilot failed to choose.
    #[error("pilot error: {source}")]
    Pilot {
        /// The underlying pilot error.
        #[from]
        source: PilotError,
    },

    /// The simulation broke an invariant.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },
}

/// When a run stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunBounds {
    /// Stop once the factory owns this many workers.
    pub target_workers: u32,
    /// Stop once the clock reaches this tick.
    pub max_ticks: u64,
}

impl From<&SimulationBoundsConfig> for RunBounds {
    fn from(config: &SimulationBoundsConfig) -> Self {
        Self {
            target_workers: config.target_workers,
            max_ticks: config.max_ticks,
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// The factory owns the target number of workers.
    TargetReached,
    /// The tick bound was hit first.
    MaxTicksReached,
}

/// Outcome of [`run_until_target`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Why the run stopped.
    pub end_reason: RunEndReason,
    /// State at the end of the run.
    pub final_snapshot: FactorySnapshot,
    /// Decision rounds played.
    pub rounds: u64,
    /// Batches the factory refused.
    pub rejected_batches: u64,
}

/// Hook called once per decision round, before the pilot chooses.
pub trait RoundCallback {
    /// Called with the state the pilot is about to see.
    fn on_round(&mut self, snapshot: &FactorySnapshot);

    /// Called when the factory refuses a batch.
    fn on_rejected(&mut self, _error: &SimulationError) {}
}

/// A callback that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl RoundCallback for NoOpCallback {
    fn on_round(&mut self, _snapshot: &FactorySnapshot) {}
}

/// Play decision rounds until the target is reached or time runs out.
///
/// # Errors
///
/// Returns [`RunnerError`] if the pilot fails or the simulation breaks an
/// invariant. Rejected batches are not errors.
pub fn run_until_target<R: Rng>(
    sim: &mut Simulation<R>,
    pilot: &mut dyn Pilot,
    bounds: RunBounds,
    callback: &mut dyn RoundCallback,
) -> Result<RunResult, RunnerError> {
    let mut rounds: u64 = 0;
    let mut rejected_batches: u64 = 0;

    info!(
        target_workers = bounds.target_workers,
        max_ticks = bounds.max_ticks,
        "Run starting"
    );

    loop {
        let snapshot = sim.snapshot();

        let workers = u64::try_from(snapshot.worker_count()).unwrap_or(u64::MAX);
        let end_reason = if workers >= u64::from(bounds.target_workers) {
            Some(RunEndReason::TargetReached)
        } else if snapshot.tick >= bounds.max_ticks {
            Some(RunEndReason::MaxTicksReached)
        } else {
            None
        };
        if let Some(end_reason) = end_reason {
            info!(
                reason = ?end_reason,
                tick = snapshot.tick,
                workers,
                rounds,
                rejected_batches,
                "Run ended"
            );
            return Ok(RunResult {
                end_reason,
                final_snapshot: snapshot,
                rounds,
                rejected_batches,
            });
        }

        callback.on_round(&snapshot);
        let batch = pilot.choose_tasks(&snapshot)?;
        rounds = rounds.saturating_add(1);

        if batch.is_empty() {
            sim.advance(true)?;
            continue;
        }

        match sim.load(&batch) {
            Ok(_) => {
                sim.advance(false)?;
            }
            Err(err) if err.is_recoverable() => {
                warn!(tick = snapshot.tick, error = %err, "Batch rejected");
                callback.on_rejected(&err);
                rejected_batches = rejected_batches.saturating_add(1);
                sim.advance(true)?;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use foobar_types::{Resource, TaskRequest};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::FactoryConfig;
    use crate::pilot::SmartAutopilot;

    fn simulation(resources: &[(Resource, u32)]) -> Simulation<SmallRng> {
        let config = FactoryConfig {
            initial_workers: 2,
            starting_resources: resources.iter().copied().collect::<BTreeMap<_, _>>(),
        };
        Simulation::new(&config, SmallRng::seed_from_u64(42))
    }

    /// Always asks for the same batch.
    struct FixedPilot(Vec<TaskRequest>);

    impl Pilot for FixedPilot {
        fn choose_tasks(
            &mut self,
            _snapshot: &FactorySnapshot,
        ) -> Result<Vec<TaskRequest>, PilotError> {
            Ok(self.0.clone())
        }
    }

    /// Counts rounds and rejections.
    #[derive(Default)]
    struct Counter {
        rounds: u64,
        rejected: u64,
    }

    impl RoundCallback for Counter {
        fn on_round(&mut self, _snapshot: &FactorySnapshot) {
            self.rounds = self.rounds.saturating_add(1);
        }

        fn on_rejected(&mut self, _error: &SimulationError) {
            self.rejected = self.rejected.saturating_add(1);
        }
    }

    #[test]
    fn already_at_target_ends_immediately() {
        let mut sim = simulation(&[]);
        let bounds = RunBounds {
            target_workers: 2,
            max_ticks: 100,
        };
        let result =
            run_until_target(&mut sim, &mut SmartAutopilot::new(), bounds, &mut NoOpCallback)
                .unwrap();
        assert_eq!(result.end_reason, RunEndReason::TargetReached);
        assert_eq!(result.rounds, 0);
        assert_eq!(result.final_snapshot.tick, 0);
    }

    #[test]
    fn smart_pilot_buys_a_robot() {
        let mut sim = simulation(&[]);
        let bounds = RunBounds {
            target_workers: 3,
            max_ticks: 10_000,
        };
        let result =
            run_until_target(&mut sim, &mut SmartAutopilot::new(), bounds, &mut NoOpCallback)
                .unwrap();
        assert_eq!(result.end_reason, RunEndReason::TargetReached);
        assert!(result.final_snapshot.worker_count() >= 3);
        assert!(result.final_snapshot.tick > 0);
    }

    #[test]
    fn idle_pilot_runs_into_the_tick_bound() {
        let mut sim = simulation(&[]);
        let bounds = RunBounds {
            target_workers: 3,
            max_ticks: 5,
        };
        let mut counter = Counter::default();
        let result =
            run_until_target(&mut sim, &mut FixedPilot(Vec::new()), bounds, &mut counter)
                .unwrap();
        assert_eq!(result.end_reason, RunEndReason::MaxTicksReached);
        assert_eq!(result.final_snapshot.tick, 5);
        assert_eq!(result.rounds, 5);
        assert_eq!(counter.rounds, 5);
    }

    #[test]
    fn rejected_batches_force_progress() {
        let mut sim = simulation(&[]);
        let bounds = RunBounds {
            target_workers: 3,
            max_ticks: 3,
        };
        let mut counter = Counter::default();
        let mut pilot = FixedPilot(vec![TaskRequest::BuyRobot]);
        let result = run_until_target(&mut sim, &mut pilot, bounds, &mut counter).unwrap();
        assert_eq!(result.end_reason, RunEndReason::MaxTicksReached);
        assert_eq!(result.rejected_batches, 3);
        assert_eq!(counter.rejected, 3);
        assert_eq!(result.final_snapshot.resource(Resource::Foo), 0);
    }

    #[test]
    fn bounds_from_config() {
        let bounds = RunBounds::from(&SimulationBoundsConfig::default());
        assert_eq!(bounds.target_workers, 30);
        assert_eq!(bounds.max_ticks, 100_000);
    }
}
