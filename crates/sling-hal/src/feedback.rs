//! Opaque numeric controller contracts.
//!
//! The state machines consume closed-loop and open-loop controllers
//! through these two traits only; the numeric internals (gains,
//! integration, motion models) are swappable without touching the
//! safety logic.

/// A closed-loop feedback controller (PID or similar).
///
/// Lifecycle: [`init`][Feedback::init] once when a control phase
/// begins, then [`update`][Feedback::update] once per tick with the
/// latest measurement; [`output`][Feedback::output] returns the most
/// recently computed command and [`is_on_target`][Feedback::is_on_target]
/// reports settling.
pub trait Feedback: Send {
    /// Begin a new control phase toward `target`, seeded with the
    /// current measurement.  Clears any accumulated state.
    fn init(&mut self, target: f64, current: f64);

    /// Feed the latest measurement and recompute the output.
    fn update(&mut self, measurement: f64);

    /// The most recently computed control output (volts).
    fn output(&self) -> f64;

    /// Whether the measured value has settled on the target.
    fn is_on_target(&self) -> bool;
}

/// An open-loop feed-forward controller.
pub trait FeedForward: Send {
    /// Compute the output for the requested target value.
    fn update(&mut self, target: f64) -> f64;
}
