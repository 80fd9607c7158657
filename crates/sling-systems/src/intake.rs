//! Intake roller state graph.
//!
//! Four states: `IntakeOff`, `Intaking`, `Outtaking`, `Unjamming`.
//! While intaking, the roller only runs when the injected gate
//! condition allows it (the catapult arm must be clear), and a stalled
//! roller automatically backs off for a short unjam interval before
//! resuming.

use std::time::Instant;

use sling_hal::MotorGroup;
use sling_machine::StateGraph;
use sling_types::Condition;
use tracing::warn;

use crate::config::IntakeTuning;

/// Discriminant for [`IntakeGraph`] states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeId {
    IntakeOff,
    Intaking,
    Outtaking,
    Unjamming,
}

/// Events the intake graph reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeMessage {
    Spin,
    Reverse,
    Stop,
    Jammed,
    Cleared,
}

/// Hardware, gate, and tuning shared by every intake state.
pub struct IntakeSystem {
    motor: Box<dyn MotorGroup>,
    allowed: Condition,
    tuning: IntakeTuning,
}

impl IntakeSystem {
    /// `allowed` gates the forward roller; build it with
    /// [`crate::cata::CataSystem::intake_gate`] to tie it to the
    /// catapult arm position.
    pub fn new(motor: Box<dyn MotorGroup>, allowed: Condition, tuning: IntakeTuning) -> Self {
        Self {
            motor,
            allowed,
            tuning,
        }
    }

    fn drive(&mut self, volts: f64) {
        if let Err(e) = self.motor.set_voltage(volts) {
            warn!(motor = self.motor.id(), error = %e, "intake motor command failed");
        }
    }

    fn stop_motor(&mut self) {
        if let Err(e) = self.motor.stop() {
            warn!(motor = self.motor.id(), error = %e, "intake motor stop failed");
        }
    }
}

/// The intake state graph.  One variant per [`IntakeId`].
pub enum IntakeGraph {
    IntakeOff,
    Intaking {
        /// Stall detection stays disarmed until this deadline passes,
        /// covering roller spin-up and any time the gate held it off.
        stall_armed_at: Instant,
    },
    Outtaking,
    Unjamming {
        until: Instant,
    },
}

impl IntakeGraph {
    fn intaking(tuning: &IntakeTuning) -> Self {
        IntakeGraph::Intaking {
            stall_armed_at: Instant::now() + tuning.spin_up(),
        }
    }

    fn unjamming(tuning: &IntakeTuning) -> Self {
        IntakeGraph::Unjamming {
            until: Instant::now() + tuning.unjam(),
        }
    }
}

impl StateGraph for IntakeGraph {
    type System = IntakeSystem;
    type Id = IntakeId;
    type Message = IntakeMessage;

    fn id(&self) -> IntakeId {
        match self {
            IntakeGraph::IntakeOff => IntakeId::IntakeOff,
            IntakeGraph::Intaking { .. } => IntakeId::Intaking,
            IntakeGraph::Outtaking => IntakeId::Outtaking,
            IntakeGraph::Unjamming { .. } => IntakeId::Unjamming,
        }
    }

    fn entry(&mut self, system: &mut IntakeSystem) {
        match self {
            IntakeGraph::IntakeOff => system.stop_motor(),
            IntakeGraph::Intaking { .. } => {
                // The gate applies from the very first tick, not just
                // in `work`.
                if system.allowed.test() {
                    let volts = system.tuning.intake_voltage;
                    system.drive(volts);
                } else {
                    system.stop_motor();
                }
            }
            IntakeGraph::Outtaking | IntakeGraph::Unjamming { .. } => {
                let volts = system.tuning.outtake_voltage;
                system.drive(volts);
            }
        }
    }

    fn work(&mut self, system: &mut IntakeSystem) -> Option<IntakeMessage> {
        match self {
            IntakeGraph::IntakeOff | IntakeGraph::Outtaking => None,
            IntakeGraph::Intaking { stall_armed_at } => {
                if !system.allowed.test() {
                    // Arm in the way: hold the roller and keep stall
                    // detection disarmed until it runs again.
                    system.stop_motor();
                    *stall_armed_at = Instant::now() + system.tuning.spin_up();
                    return None;
                }
                let volts = system.tuning.intake_voltage;
                system.drive(volts);
                if Instant::now() >= *stall_armed_at
                    && system.motor.velocity().abs() < system.tuning.stall_velocity
                {
                    warn!(rpm = system.motor.velocity(), "intake stalled");
                    return Some(IntakeMessage::Jammed);
                }
                None
            }
            IntakeGraph::Unjamming { until } => {
                (Instant::now() >= *until).then_some(IntakeMessage::Cleared)
            }
        }
    }

    fn respond(&self, system: &IntakeSystem, message: &IntakeMessage) -> Option<Self> {
        use IntakeGraph as G;
        use IntakeMessage as M;
        match (self, message) {
            (G::IntakeOff | G::Outtaking, M::Spin) => Some(G::intaking(&system.tuning)),
            (G::IntakeOff | G::Intaking { .. }, M::Reverse) => Some(G::Outtaking),
            (G::Intaking { .. } | G::Outtaking | G::Unjamming { .. }, M::Stop) => {
                Some(G::IntakeOff)
            }
            (G::Intaking { .. }, M::Jammed) => Some(G::unjamming(&system.tuning)),
            (G::Unjamming { .. }, M::Cleared) => Some(G::intaking(&system.tuning)),
            _ => None,
        }
    }
}
