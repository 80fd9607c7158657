//! Robot subsystems: the catapult and intake state graphs, their
//! tuning configuration, and the autonomous commands that drive them.
//!
//! | Module | Contents |
//! |---|---|
//! | [`cata`] | Catapult state graph, drop mode, telemetry snapshot |
//! | [`intake`] | Intake roller state graph with jam recovery |
//! | [`commands`] | Machine-driving commands and shot routines |
//! | [`config`] | TOML tuning configuration with env overrides |
//! | [`telemetry`] | Tracing subscriber setup |
//!
//! The graphs run on [`sling_machine::StateMachine`] tasks; commands
//! talk to them only through [`sling_machine::MachineClient`] handles,
//! so subsystem hardware stays owned by exactly one task.

pub mod cata;
pub mod commands;
pub mod config;
pub mod intake;
pub mod telemetry;

pub use cata::{CataGraph, CataId, CataMessage, CataPage, CataSnapshot, CataSystem, DropMode};
pub use commands::{AwaitCataState, SignalCata, fire_and_reload};
pub use config::{CataTuning, IntakeTuning, RobotConfig};
pub use intake::{IntakeGraph, IntakeId, IntakeMessage, IntakeSystem};
pub use telemetry::init_tracing;
