//! Allocator, tick driver, pilots, and run loop for the Foobar Factory.
//!
//! This crate owns the workers and the ledger (through [`Factory`]), the
//! tick clock (through [`Simulation`]) and the decision loop that ties a
//! [`Pilot`] to them.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter with checked advancement.
//! - [`config`] -- Configuration loading from `foobar-config.yaml`.
//! - [`factory`] -- Atomic batch assignment and per-tick advancement.
//! - [`pacer`] -- Wall-clock delay between ticks.
//! - [`pilot`] -- [`Pilot`] trait and the two autopilots.
//! - [`runner`] -- [`run_until_target`], the round loop.
//! - [`simulation`] -- The driver: `load`, `advance`, `snapshot`.
//!
//! [`Factory`]: factory::Factory
//! [`Simulation`]: simulation::Simulation
//! [`Pilot`]: pilot::Pilot
//! [`run_until_target`]: runner::run_until_target

pub mod clock;
pub mod config;
pub mod factory;
pub mod pacer;
pub mod pilot;
pub mod runner;
pub mod simulation;
