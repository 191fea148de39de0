//! Terminal rendering of factory snapshots.
//!
//! [`render`] turns a snapshot into the block printed every round. The
//! [`TerminalCallback`] prints it to a writer and mirrors the snapshot as a
//! JSON log line.

use std::io::Write;

use foobar_core::runner::{RoundCallback, RunEndReason, RunResult};
use foobar_core::simulation::SimulationError;
use foobar_types::{FactorySnapshot, Resource, WorkerStatus, WorkerView};
use tracing::{info, warn};

/// Erase the terminal and move the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Render the round header, the resources and one line per robot.
pub fn render(snapshot: &FactorySnapshot) -> String {
    let mut lines = vec![format!("Tick {}", snapshot.tick)];
    lines.extend([
        format!("Foos: {}", snapshot.resource(Resource::Foo)),
        format!("Bars: {}", snapshot.resource(Resource::Bar)),
        format!("Foobars: {}", snapshot.resource(Resource::Foobar)),
        format!("Money: {}", snapshot.resource(Resource::Money)),
        format!("Robots: {}", snapshot.worker_count()),
    ]);
    lines.extend(snapshot.workers.iter().map(render_worker));
    lines.join("\n")
}

fn render_worker(worker: &WorkerView) -> String {
    match (worker.status, &worker.current_task) {
        (WorkerStatus::Scheduling, Some(task)) => format!(
            "{}: scheduling {}, starts at tick {}",
            worker.id,
            task.request,
            worker
                .scheduled_start_tick
                .map_or_else(|| "?".to_owned(), |tick| tick.to_string()),
        ),
        (WorkerStatus::Working, Some(task)) => format!(
            "{}: working on {} since tick {} ({} ticks)",
            worker.id,
            task.request,
            task.start_tick
                .map_or_else(|| "?".to_owned(), |tick| tick.to_string()),
            task.duration.normalize(),
        ),
        _ => match &worker.previous_task {
            Some(previous) => format!("{}: ready (last: {})", worker.id, previous.request),
            None => format!("{}: ready", worker.id),
        },
    }
}

/// Prints every round to a terminal and logs the snapshot as JSON.
pub struct TerminalCallback<W> {
    out: W,
    clear_screen: bool,
}

impl<W: Write> TerminalCallback<W> {
    /// Print to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            clear_screen: false,
        }
    }

    /// Clear the screen before each round.
    #[must_use]
    pub const fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    /// Print the final state and how the run ended.
    pub fn finish(&mut self, result: &RunResult) -> std::io::Result<()> {
        let snapshot = &result.final_snapshot;
        writeln!(self.out, "{}", render(snapshot))?;
        match result.end_reason {
            RunEndReason::TargetReached => writeln!(
                self.out,
                "Number of robots reached after {} ticks",
                snapshot.tick
            )?,
            RunEndReason::MaxTicksReached => writeln!(
                self.out,
                "Gave up at tick {} with {} robots",
                snapshot.tick,
                snapshot.worker_count()
            )?,
        }
        self.out.flush()
    }

    fn print(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            warn!(error = %err, "failed to write to terminal");
        }
    }
}

impl<W: Write> RoundCallback for TerminalCallback<W> {
    fn on_round(&mut self, snapshot: &FactorySnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(json) => info!(tick = snapshot.tick, snapshot = %json, "Round"),
            Err(err) => warn!(error = %err, "failed to serialize snapshot"),
        }
        let text = render(snapshot);
        if self.clear_screen {
            self.print(&format!("{CLEAR_SCREEN}{text}"));
        } else {
            self.print(&text);
        }
    }

    fn on_rejected(&mut self, error: &SimulationError) {
        self.print(&format!("Factory error: {error}"));
    }
}
