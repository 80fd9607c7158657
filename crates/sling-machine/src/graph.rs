//! The [`StateGraph`] trait – a closed set of states with an
//! entry/work/exit lifecycle and a pure transition function.
//!
//! Implementors are enums whose variants are the states, each variant
//! carrying its per-visit data (deadlines, progress).  The engine owns
//! exactly one state value at a time; transitions replace it, never
//! alias it.

use std::fmt::Debug;

/// A state graph driven by [`Engine`][crate::machine::Engine].
///
/// `System` is the owning subsystem (hardware handles, controllers,
/// tuning) passed by reference into every lifecycle callback; the
/// engine owns it but the graph never does.
///
/// Per visit, [`entry`][StateGraph::entry] and
/// [`exit`][StateGraph::exit] run exactly once and
/// [`work`][StateGraph::work] runs every tick while the state is
/// resident.  [`respond`][StateGraph::respond] is the sole transition
/// function and is pure with respect to choosing the next state;
/// side effects belong in entry/exit/work.
pub trait StateGraph: Sized + Send + 'static {
    /// The subsystem the states actuate.
    type System: Send;
    /// Copyable state identifier published to other tasks.
    type Id: Copy + Eq + Debug + Send;
    /// Messages driving transitions, internal and external.
    type Message: Debug + Send;

    /// Identifier of this state.
    fn id(&self) -> Self::Id;

    /// Called once when the state becomes resident.
    fn entry(&mut self, _system: &mut Self::System) {}

    /// Called once when the state is left.
    fn exit(&mut self, _system: &mut Self::System) {}

    /// Called every tick while resident.  Returning a message feeds it
    /// into [`respond`][StateGraph::respond] on the same tick, before
    /// any externally injected message.
    fn work(&mut self, system: &mut Self::System) -> Option<Self::Message>;

    /// Decide the next state for `message`.
    ///
    /// `Some(next)` triggers a transition: `exit` on the current
    /// state, `entry` on `next`, ownership replaced.  `None` ignores
    /// the message – the self-transition case, with no entry/exit.
    fn respond(&self, system: &Self::System, message: &Self::Message) -> Option<Self>;
}
