//! `sling-command` – Composable, cancelable, timeout-aware commands.
//!
//! A command is a unit of discrete control work polled once per
//! scheduler tick until it reports completion.  Commands compose into
//! trees (sequences, parallel groups, races, branches, loops) and are
//! driven either by a parent composite or by the top-level
//! [`CommandController`][controller::CommandController].
//!
//! # Modules
//!
//! - [`command`] – [`AutoCommand`][command::AutoCommand]: the open
//!   polymorphic work unit (`run`/`on_timeout`/`duplicate`);
//!   [`Command`][command::Command]: the owning wrapper that carries the
//!   timeout and termination [`Condition`][sling_types::Condition] and
//!   enforces forced-termination semantics; plus the
//!   [`FnCommand`][command::FnCommand] and [`Wait`][command::Wait]
//!   leaves.
//! - [`composite`] – [`InOrder`][composite::InOrder],
//!   [`Parallel`][composite::Parallel],
//!   [`FirstFinish`][composite::FirstFinish],
//!   [`Branch`][composite::Branch], [`Repeat`][composite::Repeat]:
//!   structural combinators over child commands.
//! - [`controller`] – [`CommandController`][controller::CommandController]:
//!   drives a FIFO queue of commands at a fixed async tick cadence with
//!   an externally supplied cancellation predicate.
//! - [`testing`] – instrumented commands for asserting run/timeout
//!   call counts in this crate's tests and downstream crates'.
//!
//! Forced termination (timeout elapsed, termination condition fired,
//! controller cancellation) is not an error: it is a normal outcome
//! that triggers [`AutoCommand::on_timeout`][command::AutoCommand::on_timeout]
//! exactly once so the command can leave its hardware in a safe state.

pub mod command;
pub mod composite;
pub mod controller;
pub mod testing;

pub use command::{AutoCommand, Command, CommandStatus, FnCommand, Wait};
pub use composite::{Branch, FirstFinish, InOrder, Parallel, Repeat};
pub use controller::CommandController;
