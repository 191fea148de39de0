//! End-to-end scenarios for the Foobar Factory allocator and driver.
//!
//! Each test builds a fresh factory, drives it through the public API and
//! checks the ledger and the workers afterwards.

// Integration tests use unwrap extensively for clarity -- panicking on
// failure is the correct behavior in test code.
#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::BTreeMap;

use foobar_agents::Task;
use foobar_core::config::FactoryConfig;
use foobar_core::factory::{Factory, FactoryError};
use foobar_core::pilot::{DumbAutopilot, SmartAutopilot};
use foobar_core::runner::{NoOpCallback, RunBounds, RunEndReason, run_until_target};
use foobar_core::simulation::{Simulation, SimulationError};
use foobar_ledger::ResourceLedger;
use foobar_types::{Resource, TaskKind, TaskRequest, TaskStatus, WorkerId, WorkerStatus};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_decimal::Decimal;

fn config(resources: &[(Resource, u32)]) -> FactoryConfig {
    FactoryConfig {
        initial_workers: 2,
        starting_resources: resources.iter().copied().collect::<BTreeMap<_, _>>(),
    }
}

fn simulation(resources: &[(Resource, u32)]) -> Simulation<SmallRng> {
    Simulation::new(&config(resources), SmallRng::seed_from_u64(42))
}

#[test]
fn two_workers_mine_two_foos() {
    let mut sim = simulation(&[]);
    sim.load(&[TaskRequest::MineFoo, TaskRequest::MineFoo]).unwrap();
    let snapshot = sim.advance(false).unwrap();

    assert_eq!(snapshot.resource(Resource::Foo), 2);
    assert!(
        snapshot
            .workers
            .iter()
            .all(|w| w.status == WorkerStatus::Ready)
    );
}

#[test]
fn buying_a_robot_spends_everything() {
    let mut factory = Factory::new(
        2,
        ResourceLedger::with_balances([(Resource::Foo, 6), (Resource::Money, 3)]),
    );
    let robot = Task::from_parts(TaskRequest::BuyRobot, Decimal::ZERO, 1).unwrap();
    factory.commit(0, vec![robot]).unwrap();
    factory.run(0).unwrap();

    for resource in Resource::ALL {
        assert_eq!(factory.ledger().get(resource), 0, "{resource}");
    }
    assert_eq!(factory.worker_count(), 3);
}

#[test]
fn selling_six_is_invalid() {
    let mut sim = simulation(&[(Resource::Foobar, 10)]);
    let err = sim
        .load(&[TaskRequest::SellFoobar { count: 6 }])
        .unwrap_err();
    assert!(matches!(err, SimulationError::Request { .. }));
    assert_eq!(sim.snapshot().resource(Resource::Foobar), 10);
}

#[test]
fn selling_more_than_held_leaves_the_ledger_alone() {
    let mut sim = simulation(&[(Resource::Foobar, 2)]);
    let err = sim
        .load(&[TaskRequest::SellFoobar { count: 3 }])
        .unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Factory {
            source: FactoryError::InsufficientResources { .. }
        }
    ));
    assert_eq!(sim.snapshot().resource(Resource::Foobar), 2);
    assert_eq!(sim.snapshot().ready_workers(), 2);
}

#[test]
fn switching_from_bar_to_foo_costs_five_ticks() {
    let mut factory = Factory::new(1, ResourceLedger::new());
    let bar = Task::from_parts(TaskRequest::MineBar, Decimal::ONE, 1).unwrap();
    factory.commit(0, vec![bar]).unwrap();
    factory.run(0).unwrap();
    factory.run(1).unwrap();
    assert_eq!(
        factory.worker(WorkerId(0)).unwrap().previous_kind(),
        Some(TaskKind::MineBar)
    );

    let foo = Task::from_parts(TaskRequest::MineFoo, Decimal::ONE, 1).unwrap();
    let assignments = factory.commit(10, vec![foo]).unwrap();
    assert_eq!(assignments[0].start_tick, 15);
    assert_eq!(
        factory.worker(WorkerId(0)).unwrap().scheduled_start_tick(),
        Some(15)
    );
}

#[test]
fn reserving_without_delivering_keeps_the_debit() {
    let mut sim = simulation(&[(Resource::Foo, 1), (Resource::Bar, 1)]);
    sim.load(&[TaskRequest::AssembleFoobar]).unwrap();

    let snapshot = sim.snapshot();
    assert_eq!(snapshot.resource(Resource::Foo), 0);
    assert_eq!(snapshot.resource(Resource::Bar), 0);
    let worker = &snapshot.workers[0];
    assert_eq!(worker.status, WorkerStatus::Scheduling);
    assert_eq!(
        worker.current_task.as_ref().map(|t| t.status),
        Some(TaskStatus::Ready)
    );
}

#[test]
fn every_assembly_yields_foobar_or_bar() {
    let mut sim = simulation(&[(Resource::Foo, 40), (Resource::Bar, 40)]);
    for _ in 0..20 {
        let before = sim.snapshot();
        sim.load(&[TaskRequest::AssembleFoobar, TaskRequest::AssembleFoobar])
            .unwrap();
        let mut after = sim.advance(false).unwrap();
        while after.ready_workers() < 2 {
            after = sim.advance(true).unwrap();
        }
        let foobars = after
            .resource(Resource::Foobar)
            .checked_sub(before.resource(Resource::Foobar))
            .unwrap();
        let bars_back = after
            .resource(Resource::Bar)
            .checked_add(2)
            .unwrap()
            .checked_sub(before.resource(Resource::Bar))
            .unwrap();
        assert_eq!(foobars.checked_add(bars_back).unwrap(), 2);
        assert_eq!(
            before.resource(Resource::Foo).checked_sub(2).unwrap(),
            after.resource(Resource::Foo)
        );
    }
}

#[test]
fn failed_commit_is_atomic() {
    let mut sim = simulation(&[(Resource::Foo, 6), (Resource::Money, 3), (Resource::Bar, 1)]);
    let before = sim.snapshot();
    // Buying the robot takes all the foo the assembly needs.
    let err = sim
        .load(&[TaskRequest::BuyRobot, TaskRequest::AssembleFoobar])
        .unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(sim.snapshot(), before);
}

#[test]
fn smart_autopilot_reaches_a_small_target() {
    let mut sim = simulation(&[]);
    let bounds = RunBounds {
        target_workers: 5,
        max_ticks: 50_000,
    };
    let result = run_until_target(
        &mut sim,
        &mut SmartAutopilot::new(),
        bounds,
        &mut NoOpCallback,
    )
    .unwrap();
    assert_eq!(result.end_reason, RunEndReason::TargetReached);
    assert!(result.final_snapshot.worker_count() >= 5);
}

#[test]
fn dumb_autopilot_reaches_a_small_target() {
    let mut sim = simulation(&[]);
    let bounds = RunBounds {
        target_workers: 4,
        max_ticks: 50_000,
    };
    let result = run_until_target(
        &mut sim,
        &mut DumbAutopilot::new(4),
        bounds,
        &mut NoOpCallback,
    )
    .unwrap();
    assert_eq!(result.end_reason, RunEndReason::TargetReached);
    assert_eq!(result.final_snapshot.worker_count(), 4);
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut sim = simulation(&[]);
        let bounds = RunBounds {
            target_workers: 4,
            max_ticks: 50_000,
        };
        run_until_target(
            &mut sim,
            &mut SmartAutopilot::new(),
            bounds,
            &mut NoOpCallback,
        )
        .unwrap()
    };
    assert_eq!(run(), run());
}
