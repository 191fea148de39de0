//! Task requests exchanged between pilots and the simulation driver.
//!
//! A [`TaskRequest`] is the descriptor a decision-maker hands to the
//! driver. The driver turns each request into a concrete task (sampling
//! its duration and outcome) before committing the batch.

use serde::{Deserialize, Serialize};

use crate::enums::TaskKind;

/// Smallest number of foobars a single sell task may carry.
pub const MIN_SELL_COUNT: u32 = 1;

/// Largest number of foobars a single sell task may carry.
pub const MAX_SELL_COUNT: u32 = 5;

/// A request for one unit of work.
///
/// Only [`TaskRequest::SellFoobar`] carries a parameter. Its range is
/// checked when the task is built, not here, so a malformed request can
/// travel as far as the driver and be rejected there before any state is
/// touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskRequest {
    /// Mine one foo.
    MineFoo,
    /// Mine one bar.
    MineBar,
    /// Assemble one foobar.
    AssembleFoobar,
    /// Sell `count` foobars.
    SellFoobar {
        /// Number of foobars to sell (valid range 1..=5).
        count: u32,
    },
    /// Buy one robot.
    BuyRobot,
}

impl TaskRequest {
    /// Return the kind of work this request asks for.
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::MineFoo => TaskKind::MineFoo,
            Self::MineBar => TaskKind::MineBar,
            Self::AssembleFoobar => TaskKind::AssembleFoobar,
            Self::SellFoobar { .. } => TaskKind::SellFoobar,
            Self::BuyRobot => TaskKind::BuyRobot,
        }
    }
}

impl core::fmt::Display for TaskRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SellFoobar { count } => write!(f, "sell_foobar({count})"),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sell_request_serializes_with_count() {
        let json = serde_json::to_value(TaskRequest::SellFoobar { count: 3 }).unwrap();
        assert_eq!(json["kind"], "sell_foobar");
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn unit_request_parses_from_tag() {
        let req: TaskRequest = serde_json::from_str(r#"{"kind":"mine_bar"}"#).unwrap();
        assert_eq!(req, TaskRequest::MineBar);
        assert_eq!(req.kind(), TaskKind::MineBar);
    }

    #[test]
    fn sell_kind_ignores_count() {
        let a = TaskRequest::SellFoobar { count: 1 };
        let b = TaskRequest::SellFoobar { count: 5 };
        assert_eq!(a.kind(), b.kind());
    }

    #[test]
    fn display_includes_sell_count() {
        assert_eq!(TaskRequest::SellFoobar { count: 4 }.to_string(), "sell_foobar(4)");
        assert_eq!(TaskRequest::BuyRobot.to_string(), "buy_robot");
    }
}
