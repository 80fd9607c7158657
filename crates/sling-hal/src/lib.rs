//! `sling-hal` – Hardware collaborator surface.
//!
//! The control core never talks to real devices directly; it consumes
//! the small capability traits defined here.  Real drivers live outside
//! this workspace (they are platform glue), while the [`sim`] module
//! provides in-process stubs so the full stack runs in headless tests.
//!
//! # Modules
//!
//! - [`motor`] – [`MotorGroup`][motor::MotorGroup]: command a voltage,
//!   stop, read measured velocity.
//! - [`sensor`] – [`AngleSensor`][sensor::AngleSensor]: read a
//!   mechanism angle in degrees.  An exact `0.0` reading is the
//!   potentiometer warm-up sentinel and is treated as "not yet
//!   actionable" by consumers.
//! - [`feedback`] – [`Feedback`][feedback::Feedback] /
//!   [`FeedForward`][feedback::FeedForward]: opaque numeric controller
//!   contracts consumed by the state machines.
//! - [`pid`] – [`PidController`][pid::PidController]: a concrete
//!   [`Feedback`][feedback::Feedback] implementation.
//! - [`sim`] – [`SimMotorGroup`][sim::SimMotorGroup] and
//!   [`SimAngleSensor`][sim::SimAngleSensor]: recording stubs for tests
//!   and CI.

pub mod feedback;
pub mod motor;
pub mod pid;
pub mod sensor;
pub mod sim;

pub use feedback::{FeedForward, Feedback};
pub use motor::MotorGroup;
pub use pid::PidController;
pub use sensor::AngleSensor;
pub use sim::{SimAngleSensor, SimMotorGroup};
