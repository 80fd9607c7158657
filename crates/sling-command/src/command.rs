//! The [`AutoCommand`] work unit and the [`Command`] wrapper that
//! drives it.
//!
//! A leaf command's lifecycle is **Fresh → Running → {Completed |
//! TimedOut | ConditionEnded}**, terminal in all three end states.  The
//! command itself only implements the work ([`AutoCommand::run`]) and
//! the cleanup ([`AutoCommand::on_timeout`]); deadlines and termination
//! conditions are checked by the driving loop through the [`Command`]
//! wrapper, never by the command.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use sling_command::{Command, CommandStatus, FnCommand};
//!
//! let mut cmd = Command::new(FnCommand::new(|| true)).with_timeout(Duration::from_secs(1));
//! assert_eq!(cmd.tick(), CommandStatus::Done);
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use sling_types::Condition;
use tracing::{debug, warn};

// ────────────────────────────────────────────────────────────────────────────
// AutoCommand
// ────────────────────────────────────────────────────────────────────────────

/// A polymorphic unit of discrete control work.
///
/// Implementations are single-owner and single-use-per-run: once a
/// command has completed (naturally or forcibly) the instance is
/// discarded; [`duplicate`][AutoCommand::duplicate] produces a fresh
/// copy for reuse.
pub trait AutoCommand: Send {
    /// Poll the command.  Called once per scheduler tick; must be safe
    /// to call every tick and returns `true` exactly once completion is
    /// reached.  A no-op command may return `true` immediately.
    fn run(&mut self) -> bool;

    /// Cleanup hook invoked at most once, only when the command is
    /// forcibly ended (timeout, termination condition, or controller
    /// cancellation).  Must leave any owned hardware in a safe state.
    fn on_timeout(&mut self) {}

    /// Return a copy equivalent to this command's state immediately
    /// after construction, independent of any mutation from a prior
    /// run.  Implementations owning child commands duplicate them
    /// recursively.
    fn duplicate(&self) -> Box<dyn AutoCommand>;
}

// ────────────────────────────────────────────────────────────────────────────
// Command wrapper
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of one [`Command::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Still working; poll again next tick.
    Running,
    /// Natural completion.  `on_timeout` was not invoked.
    Done,
    /// Forced termination (timeout or termination condition).
    /// `on_timeout` has been invoked.
    ForceEnded,
}

/// Owning wrapper around an [`AutoCommand`] carrying its deadline, its
/// termination condition, and the started/finished bookkeeping.
///
/// Whichever of {natural completion, termination condition, timeout}
/// occurs first wins; only the latter two invoke
/// [`AutoCommand::on_timeout`], and they invoke it exactly once.
pub struct Command {
    inner: Option<Box<dyn AutoCommand>>,
    timeout: Option<Duration>,
    end_when: Option<Condition>,
    started: Option<Instant>,
    finished: bool,
}

impl Command {
    /// Wrap a concrete command.  No timeout and no termination
    /// condition by default.
    pub fn new(inner: impl AutoCommand + 'static) -> Self {
        Self::from_boxed(Box::new(inner))
    }

    /// Wrap an already-boxed command.
    pub fn from_boxed(inner: Box<dyn AutoCommand>) -> Self {
        Self {
            inner: Some(inner),
            timeout: None,
            end_when: None,
            started: None,
            finished: false,
        }
    }

    /// A command with no underlying implementation.  Ticking it logs a
    /// warning and reports immediate completion – a fail-safe default
    /// so a mis-wired routine degrades to a no-op instead of faulting.
    pub fn none() -> Self {
        Self {
            inner: None,
            timeout: None,
            end_when: None,
            started: None,
            finished: false,
        }
    }

    /// Bound this command's total run time.  A zero duration disables
    /// the timeout entirely (the "never time out" sentinel).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = if timeout.is_zero() { None } else { Some(timeout) };
        self
    }

    /// Remove any timeout.
    pub fn never_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Attach a termination condition checked once per tick alongside
    /// the timeout.  If it becomes true before natural completion the
    /// command is force-ended.
    pub fn until(mut self, condition: Condition) -> Self {
        self.end_when = Some(condition);
        self
    }

    /// Whether the command has ended (naturally or forcibly).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drive the command one tick.
    ///
    /// The first call arms the timeout clock.  Natural completion is
    /// checked before the termination condition and the timeout, so a
    /// command that finishes on the same tick its deadline expires
    /// counts as completed and does not receive `on_timeout`.
    /// Ticking an already-finished command is a no-op reporting
    /// [`CommandStatus::Done`].
    pub fn tick(&mut self) -> CommandStatus {
        if self.finished {
            return CommandStatus::Done;
        }
        let Some(inner) = self.inner.as_mut() else {
            warn!("command has no implementation; reporting immediate completion");
            self.finished = true;
            return CommandStatus::Done;
        };

        let started = *self.started.get_or_insert_with(Instant::now);

        if inner.run() {
            self.finished = true;
            return CommandStatus::Done;
        }
        if let Some(condition) = &self.end_when
            && condition.test()
        {
            debug!("command force-ended by termination condition");
            inner.on_timeout();
            self.finished = true;
            return CommandStatus::ForceEnded;
        }
        if let Some(timeout) = self.timeout
            && started.elapsed() >= timeout
        {
            debug!(?timeout, "command force-ended by timeout");
            inner.on_timeout();
            self.finished = true;
            return CommandStatus::ForceEnded;
        }
        CommandStatus::Running
    }

    /// Force-end the command now, invoking `on_timeout` if it has not
    /// already ended.  Idempotent; used by parent composites and the
    /// controller for cancellation.
    pub fn force_end(&mut self) {
        if self.finished {
            return;
        }
        if let Some(inner) = self.inner.as_mut() {
            inner.on_timeout();
        }
        self.finished = true;
    }

    /// A fresh copy in its pre-run state: duplicated inner command,
    /// same timeout and termination condition, cleared clock and
    /// finished flag.
    pub fn duplicate(&self) -> Command {
        Command {
            inner: self.inner.as_ref().map(|inner| inner.duplicate()),
            timeout: self.timeout,
            end_when: self.end_when.clone(),
            started: None,
            finished: false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Leaf commands
// ────────────────────────────────────────────────────────────────────────────

/// Adapts a stateless closure into an [`AutoCommand`].
///
/// The closure is polled every tick and returns completion, exactly
/// like [`AutoCommand::run`].  Stateful leaves should implement the
/// trait directly so [`AutoCommand::duplicate`] can reset them.
pub struct FnCommand {
    action: Arc<dyn Fn() -> bool + Send + Sync>,
}

impl FnCommand {
    /// Wrap `action` as a command.
    pub fn new(action: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self {
            action: Arc::new(action),
        }
    }
}

impl AutoCommand for FnCommand {
    fn run(&mut self) -> bool {
        (self.action)()
    }

    fn duplicate(&self) -> Box<dyn AutoCommand> {
        Box::new(Self {
            action: Arc::clone(&self.action),
        })
    }
}

/// Completes once a fixed duration has elapsed.
///
/// Unlike [`Condition::after`], the clock arms on the first
/// [`run`][AutoCommand::run] call, so a duplicated `Wait` (as used
/// inside [`Repeat`][crate::composite::Repeat]) measures from its own
/// start rather than from construction.
pub struct Wait {
    length: Duration,
    deadline: Option<Instant>,
}

impl Wait {
    /// Wait for `length`.
    pub fn new(length: Duration) -> Self {
        Self {
            length,
            deadline: None,
        }
    }
}

impl AutoCommand for Wait {
    fn run(&mut self) -> bool {
        let deadline = *self
            .deadline
            .get_or_insert_with(|| Instant::now() + self.length);
        Instant::now() >= deadline
    }

    fn duplicate(&self) -> Box<dyn AutoCommand> {
        Box::new(Self::new(self.length))
    }
}
