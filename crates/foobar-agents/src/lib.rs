//! Task lifecycle and worker state machine for the Foobar Factory simulation.
//!
//! This crate contains the logic layer for the things that do work in the
//! factory. It sits between `foobar-types` (plain data) and `foobar-core`
//! (which owns the workers and the ledger and drives the clock).
//!
//! # Modules
//!
//! - [`error`] -- Error types for task and worker operations
//! - [`task`] -- Task construction, reservation, progress, and delivery ([`Task`])
//! - [`worker`] -- The worker state machine and switch penalty ([`Worker`])

pub mod error;
pub mod task;
pub mod worker;

// Re-export primary types at crate root for convenience.
pub use error::{TaskError, WorkerError};
pub use task::{
    ASSEMBLE_SUCCESS_PROBABILITY, Delivery, ROBOT_PRICE_FOO, ROBOT_PRICE_MONEY, Task,
};
pub use worker::{SWITCH_PENALTY_TICKS, Worker};
