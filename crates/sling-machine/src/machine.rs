//! [`Engine`] and [`StateMachine`] – the state-graph runtime.
//!
//! One [`Engine::tick`] performs the fixed loop: run `work()` on the
//! current state, process the internal message it may yield, then
//! atomically drain and process the single-slot external mailbox.
//! [`StateMachine::spawn`] runs that loop on a dedicated background
//! tokio task with a fixed sleep between ticks; the task runs for the
//! lifetime of the handle (there is no terminal state).
//!
//! Only the published state identifier and the mailbox are shared
//! between the task and external callers, behind one mutex held just
//! long enough to swap a message or publish an id.  Entry/work/exit
//! run exclusively on the engine task.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, warn};

use crate::graph::StateGraph;

// ────────────────────────────────────────────────────────────────────────────
// Shared slot
// ────────────────────────────────────────────────────────────────────────────

/// The cross-task window into a running machine: published id plus the
/// single-slot external mailbox.
struct Shared<I, M> {
    current: I,
    mailbox: Option<M>,
}

fn lock<'a, I, M>(shared: &'a Mutex<Shared<I, M>>) -> MutexGuard<'a, Shared<I, M>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

// ────────────────────────────────────────────────────────────────────────────
// MachineClient
// ────────────────────────────────────────────────────────────────────────────

/// Cheap cloneable handle for interacting with a machine from other
/// tasks.
pub struct MachineClient<G: StateGraph> {
    shared: Arc<Mutex<Shared<G::Id, G::Message>>>,
}

impl<G: StateGraph> Clone for MachineClient<G> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<G: StateGraph> MachineClient<G> {
    /// Inject a message into the machine's external mailbox.
    ///
    /// Non-blocking, single-slot, last-write-wins: a message still
    /// pending from before the next tick is overwritten and dropped.
    /// Callers needing guaranteed delivery must observe the expected
    /// transition via [`current_state`][Self::current_state].
    pub fn send_message(&self, message: G::Message) {
        let mut shared = lock(&self.shared);
        if let Some(dropped) = shared.mailbox.replace(message) {
            warn!(?dropped, "pending message overwritten before delivery");
        }
    }

    /// The identifier of the currently resident state.
    pub fn current_state(&self) -> G::Id {
        lock(&self.shared).current
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// One machine's synchronous core: the owned system, the resident
/// state, and the shared slot.
///
/// The engine is deliberately runtime-agnostic – [`tick`][Engine::tick]
/// can be driven from a test loop as easily as from the background
/// task [`StateMachine::spawn`] creates.
pub struct Engine<G: StateGraph> {
    system: G::System,
    state: G,
    shared: Arc<Mutex<Shared<G::Id, G::Message>>>,
}

impl<G: StateGraph> Engine<G> {
    /// Take ownership of `system`, make `initial` resident (running
    /// its `entry`), and publish its identifier.
    pub fn new(mut system: G::System, mut initial: G) -> Self {
        initial.entry(&mut system);
        debug!(state = ?initial.id(), "state machine starting");
        let shared = Arc::new(Mutex::new(Shared {
            current: initial.id(),
            mailbox: None,
        }));
        Self {
            system,
            state: initial,
            shared,
        }
    }

    /// A client handle sharing this engine's slot.
    pub fn client(&self) -> MachineClient<G> {
        MachineClient {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Identifier of the resident state.
    pub fn current_state(&self) -> G::Id {
        self.state.id()
    }

    /// One runtime tick: work, internal message, then the external
    /// mailbox.  Internal transitions take priority – the work-yielded
    /// message is processed before the externally buffered one.
    pub fn tick(&mut self) {
        if let Some(message) = self.state.work(&mut self.system) {
            self.process(message);
        }
        let external = lock(&self.shared).mailbox.take();
        if let Some(message) = external {
            self.process(message);
        }
    }

    fn process(&mut self, message: G::Message) {
        match self.state.respond(&self.system, &message) {
            Some(mut next) => {
                debug!(from = ?self.state.id(), to = ?next.id(), ?message, "state transition");
                self.state.exit(&mut self.system);
                next.entry(&mut self.system);
                self.state = next;
                lock(&self.shared).current = self.state.id();
            }
            None => {
                debug!(state = ?self.state.id(), ?message, "message ignored");
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// StateMachine
// ────────────────────────────────────────────────────────────────────────────

/// Owning handle for a machine running on its own background task.
///
/// Dropping the handle aborts the task; the graph itself has no
/// terminal state.
pub struct StateMachine<G: StateGraph> {
    client: MachineClient<G>,
    task: tokio::task::JoinHandle<()>,
}

impl<G: StateGraph> StateMachine<G> {
    /// Start a machine: `initial` becomes resident immediately (its
    /// `entry` runs on the calling task), then the engine loop runs on
    /// a spawned task, sleeping `tick` between iterations.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(system: G::System, initial: G, tick: Duration) -> Self {
        let mut engine = Engine::new(system, initial);
        let client = engine.client();
        let task = tokio::spawn(async move {
            loop {
                engine.tick();
                tokio::time::sleep(tick).await;
            }
        });
        Self { client, task }
    }

    /// See [`MachineClient::send_message`].
    pub fn send_message(&self, message: G::Message) {
        self.client.send_message(message);
    }

    /// See [`MachineClient::current_state`].
    pub fn current_state(&self) -> G::Id {
        self.client.current_state()
    }

    /// A fresh client handle for wiring into commands or UI pages.
    pub fn client(&self) -> MachineClient<G> {
        self.client.clone()
    }
}

impl<G: StateGraph> Drop for StateMachine<G> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
