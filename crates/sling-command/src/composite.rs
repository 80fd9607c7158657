//! Composite commands – structural combinators over child
//! [`Command`]s.
//!
//! | Combinator | Completes when | `on_timeout` forwards to |
//! |---|---|---|
//! | [`InOrder`] | the last child completes | the active child only |
//! | [`Parallel`] | every child has completed | every unfinished child |
//! | [`FirstFinish`] | the first child completes | every other unfinished child |
//! | [`Branch`] | the chosen child completes | the chosen child (if ever chosen) |
//! | [`Repeat`] | never | the active child of the current cycle |
//!
//! A composite's own timeout (set on its [`Command`] wrapper) bounds
//! the whole group; children carry their own independent deadlines,
//! checked inside the composite's `run` via [`Command::tick`].

use sling_types::Condition;
use tracing::debug;

use crate::command::{AutoCommand, Command, CommandStatus};

// ────────────────────────────────────────────────────────────────────────────
// InOrder
// ────────────────────────────────────────────────────────────────────────────

/// Runs children strictly one after another.
///
/// Exactly one child is driven per tick; when it ends (naturally or by
/// its own deadline) the next child starts on the *following* tick.
pub struct InOrder {
    children: Vec<Command>,
    active: usize,
}

impl InOrder {
    /// Compose `children` into a sequence.
    pub fn new(children: Vec<Command>) -> Self {
        Self {
            children,
            active: 0,
        }
    }
}

impl AutoCommand for InOrder {
    fn run(&mut self) -> bool {
        let Some(child) = self.children.get_mut(self.active) else {
            return true;
        };
        match child.tick() {
            CommandStatus::Running => false,
            CommandStatus::Done | CommandStatus::ForceEnded => {
                self.active += 1;
                self.active >= self.children.len()
            }
        }
    }

    fn on_timeout(&mut self) {
        // Only the child that was actually running needs cleanup;
        // already-completed children left their hardware safe.
        if let Some(child) = self.children.get_mut(self.active) {
            child.force_end();
        }
    }

    fn duplicate(&self) -> Box<dyn AutoCommand> {
        Box::new(Self::new(
            self.children.iter().map(Command::duplicate).collect(),
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parallel
// ────────────────────────────────────────────────────────────────────────────

/// Drives all children every tick; completes only once every child has
/// completed at least once.
pub struct Parallel {
    children: Vec<Command>,
}

impl Parallel {
    /// Compose `children` into a parallel group.
    pub fn new(children: Vec<Command>) -> Self {
        Self { children }
    }
}

impl AutoCommand for Parallel {
    fn run(&mut self) -> bool {
        let mut all_finished = true;
        for child in &mut self.children {
            if child.is_finished() {
                continue;
            }
            if child.tick() == CommandStatus::Running {
                all_finished = false;
            }
        }
        all_finished
    }

    fn on_timeout(&mut self) {
        for child in &mut self.children {
            if !child.is_finished() {
                child.force_end();
            }
        }
    }

    fn duplicate(&self) -> Box<dyn AutoCommand> {
        Box::new(Self::new(
            self.children.iter().map(Command::duplicate).collect(),
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FirstFinish
// ────────────────────────────────────────────────────────────────────────────

/// Races children; completes the instant the first one ends and
/// force-ends all the others so they can clean up.
pub struct FirstFinish {
    children: Vec<Command>,
}

impl FirstFinish {
    /// Compose `children` into a race.
    pub fn new(children: Vec<Command>) -> Self {
        Self { children }
    }
}

impl AutoCommand for FirstFinish {
    fn run(&mut self) -> bool {
        let mut winner = None;
        for (index, child) in self.children.iter_mut().enumerate() {
            if child.tick() != CommandStatus::Running {
                winner = Some(index);
                break;
            }
        }
        let Some(winner) = winner else {
            return false;
        };
        debug!(winner, "race decided; force-ending remaining children");
        for (index, child) in self.children.iter_mut().enumerate() {
            if index != winner && !child.is_finished() {
                child.force_end();
            }
        }
        true
    }

    fn on_timeout(&mut self) {
        for child in &mut self.children {
            if !child.is_finished() {
                child.force_end();
            }
        }
    }

    fn duplicate(&self) -> Box<dyn AutoCommand> {
        Box::new(Self::new(
            self.children.iter().map(Command::duplicate).collect(),
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Branch
// ────────────────────────────────────────────────────────────────────────────

/// Evaluates a predicate exactly once to choose between two candidate
/// commands, then delegates every subsequent call to the chosen child
/// only.
///
/// The decision is memoized on the first `run`; duplicating a branch
/// clears it, so a branch reused inside [`Repeat`] re-reads the world
/// on each cycle.
pub struct Branch {
    predicate: Condition,
    on_true: Command,
    on_false: Command,
    chosen: Option<bool>,
}

impl Branch {
    /// Choose `on_true` when `predicate` holds at first run, otherwise
    /// `on_false`.
    pub fn new(predicate: Condition, on_true: Command, on_false: Command) -> Self {
        Self {
            predicate,
            on_true,
            on_false,
            chosen: None,
        }
    }

    fn chosen_child(&mut self) -> Option<&mut Command> {
        match self.chosen? {
            true => Some(&mut self.on_true),
            false => Some(&mut self.on_false),
        }
    }
}

impl AutoCommand for Branch {
    fn run(&mut self) -> bool {
        if self.chosen.is_none() {
            let choice = self.predicate.test();
            debug!(choice, "branch decided");
            self.chosen = Some(choice);
        }
        // chosen is Some from here on.
        match self.chosen_child() {
            Some(child) => child.tick() != CommandStatus::Running,
            None => true,
        }
    }

    fn on_timeout(&mut self) {
        // If the predicate was never evaluated, neither child ran and
        // there is nothing to clean up.
        if let Some(child) = self.chosen_child() {
            child.force_end();
        }
    }

    fn duplicate(&self) -> Box<dyn AutoCommand> {
        Box::new(Self::new(
            self.predicate.clone(),
            self.on_true.duplicate(),
            self.on_false.duplicate(),
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Repeat
// ────────────────────────────────────────────────────────────────────────────

/// Re-instantiates and replays a template sequence of commands
/// indefinitely – the building block for oscillating and retry
/// behaviours.
///
/// `run` never returns `true`; bound a repeat with
/// [`Command::with_timeout`] or [`Command::until`].
pub struct Repeat {
    template: Vec<Command>,
    live: Vec<Command>,
    active: usize,
}

impl Repeat {
    /// Loop `template` forever.
    pub fn new(template: Vec<Command>) -> Self {
        Self {
            template,
            live: Vec::new(),
            active: 0,
        }
    }
}

impl AutoCommand for Repeat {
    fn run(&mut self) -> bool {
        if self.template.is_empty() {
            return false;
        }
        if self.active >= self.live.len() {
            debug!("repeat cycle complete; restarting from template");
            self.live = self.template.iter().map(Command::duplicate).collect();
            self.active = 0;
        }
        match self.live[self.active].tick() {
            CommandStatus::Running => {}
            CommandStatus::Done | CommandStatus::ForceEnded => self.active += 1,
        }
        false
    }

    fn on_timeout(&mut self) {
        if let Some(child) = self.live.get_mut(self.active) {
            child.force_end();
        }
    }

    fn duplicate(&self) -> Box<dyn AutoCommand> {
        Box::new(Self::new(
            self.template.iter().map(Command::duplicate).collect(),
        ))
    }
}
