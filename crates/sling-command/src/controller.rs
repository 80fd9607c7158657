//! [`CommandController`] – drives a FIFO queue of commands to
//! completion.
//!
//! The controller runs on the caller's task (typically the
//! competition-phase entry task) and blocks it until the queue drains
//! or the cancellation predicate fires.  Each queued command is polled
//! once per tick; its own timeout and termination condition are
//! enforced through [`Command::tick`], and controller-level
//! cancellation aborts the whole queue.
//!
//! # Example
//!
//! ```rust,no_run
//! use sling_command::{Command, CommandController, FnCommand};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut controller = CommandController::new();
//!     controller.add(Command::new(FnCommand::new(|| true)));
//!     controller.run().await;
//! }
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use sling_types::Condition;
use tracing::{debug, info, warn};

use crate::command::{AutoCommand, Command, CommandStatus};

/// Default polling cadence, matching the loop rate the rest of the
/// robot runs at.
const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// Runs queued [`Command`]s cooperatively, in order, at a fixed tick.
///
/// Commands are consumed destructively as the controller runs; after
/// [`run`][CommandController::run] returns the controller is normally
/// discarded.
pub struct CommandController {
    queue: VecDeque<Command>,
    cancel: Condition,
    tick: Duration,
}

impl CommandController {
    /// An empty controller with the default 10 ms tick and a
    /// never-cancel predicate.
    pub fn new() -> Self {
        Self::with_tick(DEFAULT_TICK)
    }

    /// An empty controller polling at `tick`.
    pub fn with_tick(tick: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            cancel: Condition::never(),
            tick,
        }
    }

    /// Append a wrapped command to the queue.
    pub fn add(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Convenience: wrap and append a raw [`AutoCommand`].
    pub fn add_command(&mut self, command: impl AutoCommand + 'static) {
        self.add(Command::new(command));
    }

    /// Replace the cancellation predicate (default: never cancel).
    ///
    /// Checked once per tick; when it fires, the active command is
    /// force-ended and every remaining queued command is dropped
    /// without ever being started.
    pub fn set_cancel_func(&mut self, cancel: Condition) {
        self.cancel = cancel;
    }

    /// Number of commands still queued (including the active one while
    /// [`run`][CommandController::run] is in progress).
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drive the queue until it drains or cancellation fires.
    pub async fn run(&mut self) {
        info!(commands = self.queue.len(), "command controller starting");
        while let Some(mut command) = self.queue.pop_front() {
            loop {
                if self.cancel.test() {
                    warn!(
                        dropped = self.queue.len(),
                        "controller canceled; force-ending active command"
                    );
                    command.force_end();
                    self.queue.clear();
                    return;
                }
                let status = command.tick();
                // Every tick is cadence-separated, including the one
                // that finishes a command.
                tokio::time::sleep(self.tick).await;
                match status {
                    CommandStatus::Running => {}
                    CommandStatus::Done => break,
                    CommandStatus::ForceEnded => {
                        debug!("active command force-ended; moving to next");
                        break;
                    }
                }
            }
        }
        debug!("command queue drained");
    }
}

impl Default for CommandController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn fast_controller() -> CommandController {
        CommandController::with_tick(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn runs_queue_in_order_to_completion() {
        let a = Probe::after(2);
        let b = Probe::after(3);
        let (ca, cb) = (a.counters(), b.counters());

        let mut controller = fast_controller();
        controller.add_command(a);
        controller.add_command(b);
        controller.run().await;

        assert_eq!(ca.runs(), 2);
        assert_eq!(cb.runs(), 3);
        assert_eq!(ca.timeouts() + cb.timeouts(), 0);
        assert!(controller.is_empty());
    }

    #[tokio::test]
    async fn cancellation_aborts_queue_and_cleans_active_only() {
        // The cancel predicate fires once the first command has been
        // polled three times.
        let runs = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&runs);

        struct Counting {
            runs: Arc<AtomicUsize>,
            timeouts: Arc<AtomicUsize>,
        }
        impl AutoCommand for Counting {
            fn run(&mut self) -> bool {
                self.runs.fetch_add(1, Ordering::SeqCst);
                false
            }
            fn on_timeout(&mut self) {
                self.timeouts.fetch_add(1, Ordering::SeqCst);
            }
            fn duplicate(&self) -> Box<dyn AutoCommand> {
                Box::new(Counting {
                    runs: Arc::clone(&self.runs),
                    timeouts: Arc::clone(&self.timeouts),
                })
            }
        }

        let timeouts = Arc::new(AtomicUsize::new(0));
        let first = Counting {
            runs: Arc::clone(&runs),
            timeouts: Arc::clone(&timeouts),
        };
        let second = Probe::never();
        let third = Probe::never();
        let (cs, ct) = (second.counters(), third.counters());

        let mut controller = fast_controller();
        controller.add_command(first);
        controller.add_command(second);
        controller.add_command(third);
        controller.set_cancel_func(Condition::new(move || {
            observed.load(Ordering::SeqCst) >= 3
        }));
        controller.run().await;

        assert_eq!(timeouts.load(Ordering::SeqCst), 1, "active command cleaned up");
        assert_eq!(cs.runs() + ct.runs(), 0, "queued commands never started");
        assert_eq!(cs.timeouts() + ct.timeouts(), 0);
        assert!(controller.is_empty());
    }

    #[tokio::test]
    async fn command_timeout_advances_to_next_command() {
        let stuck = Probe::never();
        let tail = Probe::after(1);
        let (cstuck, ctail) = (stuck.counters(), tail.counters());

        let mut controller = fast_controller();
        controller.add(Command::new(stuck).with_timeout(Duration::from_millis(30)));
        controller.add_command(tail);

        let start = Instant::now();
        controller.run().await;

        assert!(
            start.elapsed() < Duration::from_millis(500),
            "timeout must fire close to its 30 ms deadline"
        );
        assert_eq!(cstuck.timeouts(), 1);
        assert_eq!(ctail.runs(), 1, "queue continues after a local timeout");
    }

    #[tokio::test]
    async fn termination_condition_ends_command() {
        let stuck = Probe::never();
        let counters = stuck.counters();

        let mut controller = fast_controller();
        controller.add(
            Command::new(stuck).until(Condition::after(Duration::from_millis(20))),
        );
        controller.run().await;

        assert_eq!(counters.timeouts(), 1);
    }

    #[tokio::test]
    async fn command_boundaries_keep_tick_cadence() {
        // Two commands that each finish on their first poll must still
        // take one tick apiece.
        let mut controller = CommandController::with_tick(Duration::from_millis(20));
        controller.add_command(Probe::after(1));
        controller.add_command(Probe::after(1));

        let start = Instant::now();
        controller.run().await;

        assert!(
            start.elapsed() >= Duration::from_millis(40),
            "queue drained faster than the tick cadence"
        );
    }

    #[tokio::test]
    async fn empty_queue_returns_immediately() {
        let mut controller = CommandController::new();
        controller.run().await;
        assert!(controller.is_empty());
    }
}
