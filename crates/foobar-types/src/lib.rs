//! Shared type definitions for the Foobar Factory simulation.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: resource and task enumerations, worker handles, task
//! requests handed in by pilots, and the read-only snapshot handed back.
//!
//! # Modules
//!
//! - [`enums`] -- Resources, task kinds, task and worker statuses
//! - [`ids`] -- Stable worker handles ([`WorkerId`])
//! - [`requests`] -- Task requests issued by decision-makers
//! - [`structs`] -- Snapshot views of tasks, workers, and the factory

pub mod enums;
pub mod ids;
pub mod requests;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Resource, TaskKind, TaskStatus, WorkerStatus};
pub use ids::WorkerId;
pub use requests::{MAX_SELL_COUNT, MIN_SELL_COUNT, TaskRequest};
pub use structs::{FactorySnapshot, TaskView, WorkerView};
