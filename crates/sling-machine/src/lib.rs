//! `sling-machine` – Generic background state-machine runtime.
//!
//! A reusable engine for mechanism safety logic: a closed graph of
//! states runs on its own background task, polled at a fixed tick, and
//! reacts to messages injected from internal ticks or from other
//! tasks.  The catapult and intake graphs in `sling-systems` are the
//! concrete instantiations.
//!
//! # Modules
//!
//! - [`graph`] – [`StateGraph`][graph::StateGraph]: the trait a state
//!   enum implements (entry/work/exit lifecycle plus the pure
//!   `respond` transition function).
//! - [`machine`] – [`Engine`][machine::Engine]: one synchronous tick of
//!   the runtime, directly unit-testable;
//!   [`StateMachine`][machine::StateMachine]: spawns the engine on a
//!   background tokio task; [`MachineClient`][machine::MachineClient]:
//!   cheap cloneable handle for `send_message`/`current_state` from
//!   other tasks.
//!
//! # Delivery contract
//!
//! The external mailbox holds at most one pending message; a second
//! send before the next tick overwrites the first (last-write-wins, no
//! queueing).  Callers that need guaranteed delivery poll
//! [`current_state`][machine::MachineClient::current_state] for the
//! expected transition instead of inferring success from the send.

pub mod graph;
pub mod machine;

pub use graph::StateGraph;
pub use machine::{Engine, MachineClient, StateMachine};
