//! A pilot that asks a human at the terminal.
//!
//! For each ready robot the player is shown the actions the current stock
//! allows and answers with one key. Invalid keys are refused and asked
//! again.

use std::io::{BufRead, Write};

use foobar_core::pilot::{Pilot, PilotError, ResourceBudget};
use foobar_types::{FactorySnapshot, TaskKind, TaskRequest};

/// Menu label for each kind of task.
const fn label(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::MineFoo => "Mine (F)oo",
        TaskKind::MineBar => "Mine (B)ar",
        TaskKind::AssembleFoobar => "(A)ssemble foobar",
        TaskKind::SellFoobar => "(S)ell foobars",
        TaskKind::BuyRobot => "Buy (R)obot",
    }
}

/// What a key asks for.
enum Choice {
    Task(TaskKind),
    Nothing,
}

fn parse_key(line: &str) -> Option<Choice> {
    match line.trim().to_ascii_uppercase().as_str() {
        "F" => Some(Choice::Task(TaskKind::MineFoo)),
        "B" => Some(Choice::Task(TaskKind::MineBar)),
        "A" => Some(Choice::Task(TaskKind::AssembleFoobar)),
        "S" => Some(Choice::Task(TaskKind::SellFoobar)),
        "R" => Some(Choice::Task(TaskKind::BuyRobot)),
        "N" => Some(Choice::Nothing),
        _ => None,
    }
}

/// Turn an offered kind into a request sized against the budget.
fn request_for(kind: TaskKind, budget: &ResourceBudget) -> Option<TaskRequest> {
    match kind {
        TaskKind::MineFoo => Some(TaskRequest::MineFoo),
        TaskKind::MineBar => Some(TaskRequest::MineBar),
        TaskKind::AssembleFoobar => Some(TaskRequest::AssembleFoobar),
        TaskKind::SellFoobar => budget.largest_sale(),
        TaskKind::BuyRobot => Some(TaskRequest::BuyRobot),
    }
}

/// Reads one key per ready robot from `input`, prompting on `output`.
pub struct InteractivePilot<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractivePilot<R, W> {
    /// Prompt on `output` and read answers from `input`.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, budget: &ResourceBudget) -> Result<Option<TaskRequest>, PilotError> {
        let offered = budget.available_kinds();
        let mut menu: Vec<&str> = offered.iter().map(|&kind| label(kind)).collect();
        menu.push("Do (N)othing");
        let prompt = menu.join(", ");

        loop {
            write!(self.output, "{prompt}: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(PilotError::InputClosed);
            }

            let request = match parse_key(&line) {
                Some(Choice::Nothing) => return Ok(None),
                Some(Choice::Task(kind)) if offered.contains(&kind) => request_for(kind, budget),
                _ => None,
            };
            if let Some(request) = request {
                return Ok(Some(request));
            }
            writeln!(self.output, "Invalid key pressed, try again")?;
        }
    }
}

impl<R: BufRead, W: Write> Pilot for InteractivePilot<R, W> {
    fn choose_tasks(
        &mut self,
        snapshot: &FactorySnapshot,
    ) -> Result<Vec<TaskRequest>, PilotError> {
        let mut budget = ResourceBudget::from_snapshot(snapshot);
        let mut batch = Vec::new();
        for _ in 0..snapshot.ready_workers() {
            if let Some(request) = self.ask(&budget)? {
                budget.take(request);
                batch.push(request);
            }
        }
        Ok(batch)
    }
}
