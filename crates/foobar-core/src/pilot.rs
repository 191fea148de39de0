//! Pilots: strategies that pick the next batch of tasks.
//!
//! A pilot reads a [`FactorySnapshot`] and answers with at most one
//! [`TaskRequest`] per ready worker. While choosing, it plans against a
//! [`ResourceBudget`] copied from the snapshot and takes each pick's
//! reservation out of it, so a batch never asks for the same foo twice.
//!
//! The [`SmartAutopilot`] buys robots as early as it can. The
//! [`DumbAutopilot`] keeps the initial crew, stockpiles everything the
//! target needs and only then buys. A terminal pilot lives in the engine
//! binary.

use foobar_agents::{ROBOT_PRICE_FOO, ROBOT_PRICE_MONEY};
use foobar_types::{FactorySnapshot, MAX_SELL_COUNT, Resource, TaskKind, TaskRequest};

/// Errors a pilot can raise while choosing.
#[derive(Debug, thiserror::Error)]
pub enum PilotError {
    /// Reading or writing the pilot's terminal failed.
    #[error("pilot I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The pilot's input ended before it could choose.
    #[error("pilot input closed")]
    InputClosed,
}

/// A source of task batches.
pub trait Pilot {
    /// Choose the tasks to load for the given state.
    ///
    /// The returned batch never holds more requests than
    /// [`FactorySnapshot::ready_workers`]. An empty batch means "let time
    /// pass".
    ///
    /// # Errors
    ///
    /// Returns [`PilotError`] if the pilot cannot decide at all.
    fn choose_tasks(&mut self, snapshot: &FactorySnapshot)
    -> Result<Vec<TaskRequest>, PilotError>;
}

// ---------------------------------------------------------------------------
// Planning budget
// ---------------------------------------------------------------------------

/// Resources a pilot still considers spendable during one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceBudget {
    /// Foo on hand.
    pub foo: u32,
    /// Bar on hand.
    pub bar: u32,
    /// Foobar on hand.
    pub foobar: u32,
    /// Money on hand.
    pub money: u32,
}

impl ResourceBudget {
    /// Copy the resources out of a snapshot.
    pub fn from_snapshot(snapshot: &FactorySnapshot) -> Self {
        Self {
            foo: snapshot.resource(Resource::Foo),
            bar: snapshot.resource(Resource::Bar),
            foobar: snapshot.resource(Resource::Foobar),
            money: snapshot.resource(Resource::Money),
        }
    }

    /// Whether one assembly can be reserved.
    pub const fn can_assemble(&self) -> bool {
        self.foo >= 1 && self.bar >= 1
    }

    /// Whether a robot can be bought.
    pub const fn can_buy_robot(&self) -> bool {
        self.money >= ROBOT_PRICE_MONEY && self.foo >= ROBOT_PRICE_FOO
    }

    /// The largest sale possible, if any foobar is on hand.
    pub fn largest_sale(&self) -> Option<TaskRequest> {
        (self.foobar >= 1).then(|| TaskRequest::SellFoobar {
            count: self.foobar.min(MAX_SELL_COUNT),
        })
    }

    /// Kinds of task the budget can still cover, in menu order.
    pub fn available_kinds(&self) -> Vec<TaskKind> {
        let mut kinds = vec![TaskKind::MineFoo, TaskKind::MineBar];
        if self.can_assemble() {
            kinds.push(TaskKind::AssembleFoobar);
        }
        if self.foobar >= 1 {
            kinds.push(TaskKind::SellFoobar);
        }
        if self.can_buy_robot() {
            kinds.push(TaskKind::BuyRobot);
        }
        kinds
    }

    /// Take `request`'s reservation out of the budget.
    pub const fn take(&mut self, request: TaskRequest) {
        match request {
            TaskRequest::MineFoo | TaskRequest::MineBar => {}
            TaskRequest::AssembleFoobar => {
                self.foo = self.foo.saturating_sub(1);
                self.bar = self.bar.saturating_sub(1);
            }
            TaskRequest::SellFoobar { count } => {
                self.foobar = self.foobar.saturating_sub(count);
            }
            TaskRequest::BuyRobot => {
                self.money = self.money.saturating_sub(ROBOT_PRICE_MONEY);
                self.foo = self.foo.saturating_sub(ROBOT_PRICE_FOO);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Smart autopilot
// ---------------------------------------------------------------------------

/// Foo kept on hand before the smart pilot starts mining bar.
const SMART_FOO_FLOOR: u32 = 7;

/// Buy a robot whenever possible, otherwise turn stock into money.
///
/// For each ready worker, in order of preference: buy a robot, sell up to
/// five foobars, mine foo until seven are held, mine a bar if none is held,
/// assemble.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartAutopilot;

impl SmartAutopilot {
    /// Create a smart autopilot.
    pub const fn new() -> Self {
        Self
    }

    fn pick(budget: &ResourceBudget) -> TaskRequest {
        if budget.can_buy_robot() {
            return TaskRequest::BuyRobot;
        }
        if let Some(sale) = budget.largest_sale() {
            return sale;
        }
        if budget.foo < SMART_FOO_FLOOR {
            TaskRequest::MineFoo
        } else if budget.bar < 1 {
            TaskRequest::MineBar
        } else {
            TaskRequest::AssembleFoobar
        }
    }
}

impl Pilot for SmartAutopilot {
    fn choose_tasks(
        &mut self,
        snapshot: &FactorySnapshot,
    ) -> Result<Vec<TaskRequest>, PilotError> {
        let mut budget = ResourceBudget::from_snapshot(snapshot);
        let batch = (0..snapshot.ready_workers())
            .map(|_| {
                let request = Self::pick(&budget);
                budget.take(request);
                request
            })
            .collect();
        Ok(batch)
    }
}

// ---------------------------------------------------------------------------
// Dumb autopilot
// ---------------------------------------------------------------------------

/// Stockpile with the initial crew, then buy every robot at once.
///
/// While the factory still has only its initial crew, the pilot gathers
/// enough foobar and money to pay for every missing robot, then the foo,
/// then sells, then buys. Once the first robot has been bought it does
/// nothing but buy more.
#[derive(Debug, Clone, Copy)]
pub struct DumbAutopilot {
    target: u32,
    crew: u32,
}

impl DumbAutopilot {
    /// Aim for `target` workers, starting from a crew of two.
    pub const fn new(target: u32) -> Self {
        Self { target, crew: 2 }
    }

    /// Size of the crew the factory starts with.
    #[must_use]
    pub const fn with_initial_workers(mut self, crew: u32) -> Self {
        self.crew = crew;
        self
    }

    /// Target worker count.
    pub const fn target(self) -> u32 {
        self.target
    }

    const fn robots_to_buy(self) -> u32 {
        self.target.saturating_sub(self.crew)
    }

    fn pick(self, budget: &ResourceBudget, stockpiling: bool) -> Option<TaskRequest> {
        if !stockpiling {
            return budget.can_buy_robot().then_some(TaskRequest::BuyRobot);
        }

        let money_goal = self.robots_to_buy().saturating_mul(ROBOT_PRICE_MONEY);
        let foo_goal = self.robots_to_buy().saturating_mul(ROBOT_PRICE_FOO);
        let earned = budget.foobar.saturating_add(budget.money);

        if earned < money_goal {
            let missing = money_goal.saturating_sub(earned);
            if budget.foo < missing {
                Some(TaskRequest::MineFoo)
            } else if budget.bar < missing {
                Some(TaskRequest::MineBar)
            } else {
                Some(TaskRequest::AssembleFoobar)
            }
        } else if budget.foo < foo_goal {
            Some(TaskRequest::MineFoo)
        } else if budget.money < money_goal {
            budget.largest_sale()
        } else {
            budget.can_buy_robot().then_some(TaskRequest::BuyRobot)
        }
    }
}

impl Pilot for DumbAutopilot {
    fn choose_tasks(
        &mut self,
        snapshot: &FactorySnapshot,
    ) -> Result<Vec<TaskRequest>, PilotError> {
        let mut stockpiling =
            u32::try_from(snapshot.worker_count()).is_ok_and(|count| count <= self.crew);
        let mut budget = ResourceBudget::from_snapshot(snapshot);
        let mut batch = Vec::new();
        for _ in 0..snapshot.ready_workers() {
            if let Some(request) = self.pick(&budget, stockpiling) {
                budget.take(request);
                batch.push(request);
                // The first purchase ends the stockpiling phase, even
                // within a round.
                if request == TaskRequest::BuyRobot {
                    stockpiling = false;
                }
            }
        }
        Ok(batch)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use foobar_types::{WorkerId, WorkerStatus, WorkerView};

    use super::*;

    fn snapshot(workers: usize, ready: usize, resources: &[(Resource, u32)]) -> FactorySnapshot {
        let mut balances: BTreeMap<Resource, u32> =
            Resource::ALL.iter().map(|&r| (r, 0)).collect();
        balances.extend(resources.iter().copied());
        FactorySnapshot {
            tick: 0,
            resources: balances,
            workers: (0..workers)
                .map(|index| WorkerView {
                    id: WorkerId(index),
                    status: if index < ready {
                        WorkerStatus::Ready
                    } else {
                        WorkerStatus::Working
                    },
                    scheduled_start_tick: None,
                    current_task: None,
                    previous_task: None,
                })
                .collect(),
        }
    }

    #[test]
    fn budget_take_debits_reservations() {
        let mut budget = ResourceBudget {
            foo: 7,
            bar: 1,
            foobar: 2,
            money: 3,
        };
        budget.take(TaskRequest::BuyRobot);
        assert_eq!((budget.foo, budget.money), (1, 0));
        budget.take(TaskRequest::AssembleFoobar);
        assert_eq!((budget.foo, budget.bar), (0, 0));
        budget.take(TaskRequest::SellFoobar { count: 2 });
        assert_eq!(budget.foobar, 0);
    }

    #[test]
    fn available_kinds_follow_the_budget() {
        let empty = ResourceBudget::default();
        assert_eq!(
            empty.available_kinds(),
            vec![TaskKind::MineFoo, TaskKind::MineBar]
        );
        let rich = ResourceBudget {
            foo: 6,
            bar: 1,
            foobar: 1,
            money: 3,
        };
        assert_eq!(rich.available_kinds().len(), 5);
    }

    #[test]
    fn largest_sale_is_capped_at_five() {
        let budget = ResourceBudget {
            foobar: 9,
            ..ResourceBudget::default()
        };
        assert_eq!(
            budget.largest_sale(),
            Some(TaskRequest::SellFoobar { count: 5 })
        );
        assert_eq!(ResourceBudget::default().largest_sale(), None);
    }

    #[test]
    fn smart_mines_foo_from_nothing() {
        let batch = SmartAutopilot::new()
            .choose_tasks(&snapshot(2, 2, &[]))
            .unwrap();
        assert_eq!(batch, vec![TaskRequest::MineFoo, TaskRequest::MineFoo]);
    }

    #[test]
    fn smart_buys_then_sells_then_mines() {
        let batch = SmartAutopilot::new()
            .choose_tasks(&snapshot(
                3,
                3,
                &[(Resource::Foo, 6), (Resource::Money, 3), (Resource::Foobar, 7)],
            ))
            .unwrap();
        assert_eq!(
            batch,
            vec![
                TaskRequest::BuyRobot,
                TaskRequest::SellFoobar { count: 5 },
                TaskRequest::SellFoobar { count: 2 },
            ]
        );
    }

    #[test]
    fn smart_mines_bar_then_assembles() {
        let batch = SmartAutopilot::new()
            .choose_tasks(&snapshot(2, 2, &[(Resource::Foo, 8)]))
            .unwrap();
        assert_eq!(batch, vec![TaskRequest::MineBar, TaskRequest::MineBar]);

        let batch = SmartAutopilot::new()
            .choose_tasks(&snapshot(2, 2, &[(Resource::Foo, 8), (Resource::Bar, 1)]))
            .unwrap();
        assert_eq!(batch, vec![TaskRequest::AssembleFoobar, TaskRequest::MineBar]);
    }

    #[test]
    fn smart_never_exceeds_ready_workers() {
        let batch = SmartAutopilot::new()
            .choose_tasks(&snapshot(5, 1, &[]))
            .unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn dumb_stockpiles_foo_and_bar_first() {
        let mut pilot = DumbAutopilot::new(3);
        let batch = pilot.choose_tasks(&snapshot(2, 2, &[])).unwrap();
        assert_eq!(batch, vec![TaskRequest::MineFoo, TaskRequest::MineFoo]);

        let batch = pilot
            .choose_tasks(&snapshot(2, 2, &[(Resource::Foo, 3)]))
            .unwrap();
        assert_eq!(batch, vec![TaskRequest::MineBar, TaskRequest::MineBar]);
    }

    #[test]
    fn dumb_assembles_when_stock_allows() {
        let mut pilot = DumbAutopilot::new(3);
        let batch = pilot
            .choose_tasks(&snapshot(2, 1, &[(Resource::Foo, 3), (Resource::Bar, 3)]))
            .unwrap();
        assert_eq!(batch, vec![TaskRequest::AssembleFoobar]);
    }

    #[test]
    fn dumb_sells_then_buys() {
        let mut pilot = DumbAutopilot::new(3);
        let batch = pilot
            .choose_tasks(&snapshot(2, 1, &[(Resource::Foo, 6), (Resource::Foobar, 3)]))
            .unwrap();
        assert_eq!(batch, vec![TaskRequest::SellFoobar { count: 3 }]);

        let batch = pilot
            .choose_tasks(&snapshot(2, 1, &[(Resource::Foo, 6), (Resource::Money, 3)]))
            .unwrap();
        assert_eq!(batch, vec![TaskRequest::BuyRobot]);
    }

    #[test]
    fn dumb_stops_stockpiling_once_it_buys() {
        let mut pilot = DumbAutopilot::new(4);
        let batch = pilot
            .choose_tasks(&snapshot(
                2,
                2,
                &[(Resource::Foo, 12), (Resource::Bar, 5), (Resource::Money, 6)],
            ))
            .unwrap();
        assert_eq!(batch, vec![TaskRequest::BuyRobot, TaskRequest::BuyRobot]);
    }

    #[test]
    fn dumb_only_buys_after_the_first_purchase() {
        let mut pilot = DumbAutopilot::new(10);
        let batch = pilot.choose_tasks(&snapshot(3, 3, &[])).unwrap();
        assert!(batch.is_empty());

        let batch = pilot
            .choose_tasks(&snapshot(3, 3, &[(Resource::Foo, 12), (Resource::Money, 6)]))
            .unwrap();
        assert_eq!(batch, vec![TaskRequest::BuyRobot, TaskRequest::BuyRobot]);
    }

    #[test]
    fn dumb_respects_a_larger_crew() {
        let mut pilot = DumbAutopilot::new(4).with_initial_workers(3);
        assert_eq!(pilot.target(), 4);
        let batch = pilot.choose_tasks(&snapshot(3, 1, &[])).unwrap();
        assert_eq!(batch, vec![TaskRequest::MineFoo]);
    }
}
