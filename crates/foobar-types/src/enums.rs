//! Enumeration types for the Foobar Factory simulation.
//!
//! Every enumeration here is closed: adding a variant forces every
//! exhaustive `match` downstream (reservation, delivery, pilots, display)
//! to handle it before the workspace compiles again.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A resource held in the factory ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Raw material produced by mining foo.
    Foo,
    /// Raw material produced by mining bar.
    Bar,
    /// Assembled product made from one foo and one bar.
    Foobar,
    /// Currency earned by selling foobars.
    Money,
}

impl Resource {
    /// All resources in ledger order.
    pub const ALL: [Self; 4] = [Self::Foo, Self::Bar, Self::Foobar, Self::Money];

    /// Lowercase name used in logs and the terminal display.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Foo => "foo",
            Self::Bar => "bar",
            Self::Foobar => "foobar",
            Self::Money => "money",
        }
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// The kind of work a task performs.
///
/// Kinds are compared when deciding whether a worker pays the switch
/// penalty, so parameters (such as the number of foobars to sell) are not
/// part of the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Mine one foo.
    MineFoo,
    /// Mine one bar.
    MineBar,
    /// Try to assemble one foobar from one foo and one bar.
    AssembleFoobar,
    /// Sell up to five foobars for money.
    SellFoobar,
    /// Spend money and foo to add a worker to the factory.
    BuyRobot,
}

impl TaskKind {
    /// Lowercase name used in logs and the terminal display.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MineFoo => "mine_foo",
            Self::MineBar => "mine_bar",
            Self::AssembleFoobar => "assemble_foobar",
            Self::SellFoobar => "sell_foobar",
            Self::BuyRobot => "buy_robot",
        }
    }
}

impl core::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a task.
///
/// Status only moves forward: `Ready -> Running -> Completed -> Consumed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Built, not yet started. Resources may be reserved.
    Ready,
    /// Started at a known tick, waiting for its duration to elapse.
    Running,
    /// Duration elapsed. The result is readable and deliverable.
    Completed,
    /// Result delivered into the ledger. Terminal.
    Consumed,
}

impl core::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Consumed => "consumed",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

/// Status of a worker (robot).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    /// Idle, can accept a task.
    #[default]
    Ready,
    /// Task accepted, waiting for its scheduled start tick.
    Scheduling,
    /// Task started and progressing.
    Working,
}

impl core::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Ready => "ready",
            Self::Scheduling => "scheduling",
            Self::Working => "working",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn resource_serializes_snake_case() {
        let json = serde_json::to_string(&Resource::Foobar).unwrap();
        assert_eq!(json, "\"foobar\"");
    }

    #[test]
    fn task_kind_roundtrips_through_json() {
        let json = serde_json::to_string(&TaskKind::AssembleFoobar).unwrap();
        assert_eq!(json, "\"assemble_foobar\"");
        let back: TaskKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskKind::AssembleFoobar);
    }

    #[test]
    fn task_status_ordering_follows_lifecycle() {
        assert!(TaskStatus::Ready < TaskStatus::Running);
        assert!(TaskStatus::Running < TaskStatus::Completed);
        assert!(TaskStatus::Completed < TaskStatus::Consumed);
    }

    #[test]
    fn resource_all_is_ledger_order() {
        assert_eq!(
            Resource::ALL,
            [Resource::Foo, Resource::Bar, Resource::Foobar, Resource::Money]
        );
    }
}
