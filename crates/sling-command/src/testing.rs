//! Instrumented commands for tests.
//!
//! [`Probe`] is an [`AutoCommand`] that completes after a configurable
//! number of `run` calls and records every `run` and `on_timeout`
//! invocation in shared counters, so tests can assert exactly which
//! commands were driven and which were force-ended.
//!
//! # Example
//!
//! ```rust
//! use sling_command::{Command, CommandStatus};
//! use sling_command::testing::Probe;
//!
//! let probe = Probe::after(2);
//! let counters = probe.counters();
//! let mut cmd = Command::new(probe);
//!
//! assert_eq!(cmd.tick(), CommandStatus::Running);
//! assert_eq!(cmd.tick(), CommandStatus::Done);
//! assert_eq!(counters.runs(), 2);
//! assert_eq!(counters.timeouts(), 0);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::command::AutoCommand;

/// Shared run/timeout counters for a [`Probe`] and all its duplicates.
#[derive(Clone, Default)]
pub struct ProbeCounters {
    runs: Arc<AtomicUsize>,
    timeouts: Arc<AtomicUsize>,
}

impl ProbeCounters {
    /// Total `run` calls across the probe and its duplicates.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Total `on_timeout` calls across the probe and its duplicates.
    pub fn timeouts(&self) -> usize {
        self.timeouts.load(Ordering::SeqCst)
    }
}

/// An instrumented command completing after a fixed number of `run`
/// calls (or never).
///
/// Duplicates share the counters but reset their own progress, so
/// duplicate-fidelity tests can observe both.
pub struct Probe {
    completes_after: Option<usize>,
    calls: usize,
    counters: ProbeCounters,
}

impl Probe {
    /// A probe that completes on its `n`-th `run` call.
    pub fn after(n: usize) -> Self {
        Self {
            completes_after: Some(n),
            calls: 0,
            counters: ProbeCounters::default(),
        }
    }

    /// A probe that never completes naturally.
    pub fn never() -> Self {
        Self {
            completes_after: None,
            calls: 0,
            counters: ProbeCounters::default(),
        }
    }

    /// Handle to the shared counters.
    pub fn counters(&self) -> ProbeCounters {
        self.counters.clone()
    }
}

impl AutoCommand for Probe {
    fn run(&mut self) -> bool {
        self.calls += 1;
        self.counters.runs.fetch_add(1, Ordering::SeqCst);
        match self.completes_after {
            Some(n) => self.calls >= n,
            None => false,
        }
    }

    fn on_timeout(&mut self) {
        self.counters.timeouts.fetch_add(1, Ordering::SeqCst);
    }

    fn duplicate(&self) -> Box<dyn AutoCommand> {
        Box::new(Self {
            completes_after: self.completes_after,
            calls: 0,
            counters: self.counters.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_completes_on_nth_call() {
        let mut probe = Probe::after(3);
        assert!(!probe.run());
        assert!(!probe.run());
        assert!(probe.run());
    }

    #[test]
    fn never_probe_does_not_complete() {
        let mut probe = Probe::never();
        for _ in 0..10 {
            assert!(!probe.run());
        }
    }

    #[test]
    fn duplicate_shares_counters_but_resets_progress() {
        let mut probe = Probe::after(2);
        let counters = probe.counters();
        probe.run();

        let mut copy = probe.duplicate();
        assert!(!copy.run()); // fresh progress: first call does not complete
        assert!(copy.run());
        assert_eq!(counters.runs(), 3);
    }
}
