//! Catapult subsystem state graph.
//!
//! The catapult lives in one of five states:
//!
//! | State | Behavior |
//! |---|---|
//! | `CataOff` | Motor stopped, inert until enabled |
//! | `WaitingForDrop` | Waiting out the match-start drop settle time |
//! | `Reloading` | Feedback-driving the arm down to the ready angle |
//! | `ReadyToFire` | Holding, watching for ratchet slip |
//! | `Firing` | Full voltage until the arm releases |
//!
//! Slip detection and release detection both treat a raw `0.0` sensor
//! reading as "sensor not warmed up yet" and act on nothing until a
//! real value arrives.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sling_hal::{AngleSensor, Feedback, MotorGroup};
use sling_machine::{MachineClient, StateGraph};
use sling_types::Condition;
use tracing::{debug, warn};

use crate::config::CataTuning;

/// Whether the catapult must perform the match-start drop before it
/// can reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropMode {
    /// Start disabled; the drop sequence must run before reloading.
    #[default]
    Required,
    /// The mechanism starts pre-set; go straight to reloading.
    Unnecessary,
}

/// Discriminant for [`CataGraph`] states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CataId {
    CataOff,
    WaitingForDrop,
    Reloading,
    ReadyToFire,
    Firing,
}

/// Events the catapult graph reacts to.  Unlisted (state, message)
/// pairs are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CataMessage {
    EnableCata,
    StartDrop,
    DoneReloading,
    Fire,
    Slipped,
    DoneFiring,
    DisableCata,
}

/// Hardware and tuning shared by every catapult state.
pub struct CataSystem {
    motor: Box<dyn MotorGroup>,
    sensor: Arc<dyn AngleSensor>,
    feedback: Box<dyn Feedback>,
    tuning: CataTuning,
}

impl CataSystem {
    pub fn new(
        motor: Box<dyn MotorGroup>,
        sensor: Arc<dyn AngleSensor>,
        feedback: Box<dyn Feedback>,
        tuning: CataTuning,
    ) -> Self {
        Self {
            motor,
            sensor,
            feedback,
            tuning,
        }
    }

    pub fn tuning(&self) -> &CataTuning {
        &self.tuning
    }

    /// Whether the arm currently sits low enough (high angle) for the
    /// intake to run without feeding into a raised catapult.
    ///
    /// A `0.0` reading means the sensor has not produced a real value
    /// yet, so the conservative answer is no.
    pub fn intaking_allowed(&self) -> bool {
        let deg = self.sensor.degrees();
        deg != 0.0 && deg >= self.tuning.intake_safe_angle
    }

    /// Build a [`Condition`] over a shared sensor handle equivalent to
    /// [`Self::intaking_allowed`], for wiring into the intake graph.
    pub fn intake_gate(sensor: Arc<dyn AngleSensor>, safe_angle: f64) -> Condition {
        Condition::new(move || {
            let deg = sensor.degrees();
            deg != 0.0 && deg >= safe_angle
        })
    }

    fn drive(&mut self, volts: f64) {
        if let Err(e) = self.motor.set_voltage(volts) {
            warn!(motor = self.motor.id(), error = %e, "catapult motor command failed");
        }
    }

    fn stop_motor(&mut self) {
        if let Err(e) = self.motor.stop() {
            warn!(motor = self.motor.id(), error = %e, "catapult motor stop failed");
        }
    }
}

/// The catapult state graph.  One variant per [`CataId`].
pub enum CataGraph {
    CataOff,
    WaitingForDrop { enable_at: Instant },
    Reloading,
    ReadyToFire,
    Firing,
}

impl CataGraph {
    /// Initial state for a fresh boot under the given drop mode.
    pub fn initial(mode: DropMode) -> Self {
        match mode {
            DropMode::Required => CataGraph::CataOff,
            DropMode::Unnecessary => CataGraph::Reloading,
        }
    }

    fn waiting(settle: Duration) -> Self {
        CataGraph::WaitingForDrop {
            enable_at: Instant::now() + settle,
        }
    }
}

impl StateGraph for CataGraph {
    type System = CataSystem;
    type Id = CataId;
    type Message = CataMessage;

    fn id(&self) -> CataId {
        match self {
            CataGraph::CataOff => CataId::CataOff,
            CataGraph::WaitingForDrop { .. } => CataId::WaitingForDrop,
            CataGraph::Reloading => CataId::Reloading,
            CataGraph::ReadyToFire => CataId::ReadyToFire,
            CataGraph::Firing => CataId::Firing,
        }
    }

    fn entry(&mut self, system: &mut CataSystem) {
        match self {
            CataGraph::CataOff | CataGraph::ReadyToFire => system.stop_motor(),
            CataGraph::WaitingForDrop { .. } => {}
            CataGraph::Reloading => {
                let current = system.sensor.degrees();
                let target = system.tuning.ready_angle;
                system.feedback.init(target, current);
                debug!(current, target, "reload started");
            }
            CataGraph::Firing => {
                let volts = system.tuning.fire_voltage;
                system.drive(volts);
            }
        }
    }

    fn exit(&mut self, system: &mut CataSystem) {
        if let CataGraph::Firing = self {
            system.stop_motor();
        }
    }

    fn work(&mut self, system: &mut CataSystem) -> Option<CataMessage> {
        match self {
            CataGraph::CataOff => None,
            CataGraph::WaitingForDrop { enable_at } => {
                (Instant::now() >= *enable_at).then_some(CataMessage::EnableCata)
            }
            CataGraph::Reloading => {
                let deg = system.sensor.degrees();
                if deg == 0.0 {
                    // Sensor warm-up glitch: hold off until a real
                    // reading arrives.
                    return None;
                }
                system.feedback.update(deg);
                if system.feedback.is_on_target() {
                    return Some(CataMessage::DoneReloading);
                }
                let out = system.feedback.output();
                system.drive(out);
                None
            }
            CataGraph::ReadyToFire => {
                let deg = system.sensor.degrees();
                if deg != 0.0 && (deg - system.tuning.ready_angle).abs() > system.tuning.slip_window
                {
                    warn!(deg, ready = system.tuning.ready_angle, "catapult slipped");
                    return Some(CataMessage::Slipped);
                }
                None
            }
            CataGraph::Firing => {
                let deg = system.sensor.degrees();
                (deg != 0.0 && deg <= system.tuning.fired_angle).then_some(CataMessage::DoneFiring)
            }
        }
    }

    fn respond(&self, system: &CataSystem, message: &CataMessage) -> Option<Self> {
        use CataGraph as G;
        use CataMessage as M;
        match (self, message) {
            (G::CataOff, M::EnableCata) => Some(G::Reloading),
            (G::CataOff, M::StartDrop) => Some(G::waiting(system.tuning.drop_settle())),
            (G::WaitingForDrop { .. }, M::EnableCata) => Some(G::Reloading),
            (G::Reloading, M::DoneReloading) => Some(G::ReadyToFire),
            (G::Reloading | G::ReadyToFire, M::Fire) => Some(G::Firing),
            (G::Reloading | G::ReadyToFire | G::Firing, M::DisableCata) => Some(G::CataOff),
            (G::ReadyToFire, M::Slipped) => Some(G::Reloading),
            (G::Firing, M::DoneFiring) => Some(G::Reloading),
            _ => None,
        }
    }
}

/// Point-in-time view of the catapult for telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CataSnapshot {
    pub state: CataId,
    pub degrees: f64,
    pub intaking_allowed: bool,
}

/// Read-only telemetry handle over a running catapult machine.
pub struct CataPage {
    client: MachineClient<CataGraph>,
    sensor: Arc<dyn AngleSensor>,
    safe_angle: f64,
}

impl CataPage {
    pub fn new(client: MachineClient<CataGraph>, sensor: Arc<dyn AngleSensor>, safe_angle: f64) -> Self {
        Self {
            client,
            sensor,
            safe_angle,
        }
    }

    pub fn snapshot(&self) -> CataSnapshot {
        let degrees = self.sensor.degrees();
        CataSnapshot {
            state: self.client.current_state(),
            degrees,
            intaking_allowed: degrees != 0.0 && degrees >= self.safe_angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sling_hal::{PidController, SimAngleSensor, SimMotorGroup};
    use sling_machine::Engine;

    fn test_system(sensor: &SimAngleSensor, motor: &SimMotorGroup) -> CataSystem {
        let feedback = PidController::new(0.5, 0.0, 0.0).with_target_window(2.0);
        CataSystem::new(
            Box::new(motor.clone()),
            Arc::new(sensor.clone()),
            Box::new(feedback),
            CataTuning::default(),
        )
    }

    #[test]
    fn drop_mode_selects_initial_state() {
        let sensor = SimAngleSensor::default();
        let motor = SimMotorGroup::new("cata");

        let engine = Engine::new(
            test_system(&sensor, &motor),
            CataGraph::initial(DropMode::Required),
        );
        assert_eq!(engine.current_state(), CataId::CataOff);

        let engine = Engine::new(
            test_system(&sensor, &motor),
            CataGraph::initial(DropMode::Unnecessary),
        );
        assert_eq!(engine.current_state(), CataId::Reloading);
    }

    #[test]
    fn respond_table_matches_expected_transitions() {
        let sensor = SimAngleSensor::default();
        let motor = SimMotorGroup::new("cata");
        let system = test_system(&sensor, &motor);

        let cases: &[(CataGraph, CataMessage, Option<CataId>)] = &[
            (CataGraph::CataOff, CataMessage::EnableCata, Some(CataId::Reloading)),
            (CataGraph::CataOff, CataMessage::StartDrop, Some(CataId::WaitingForDrop)),
            (CataGraph::CataOff, CataMessage::Fire, None),
            (CataGraph::Reloading, CataMessage::DoneReloading, Some(CataId::ReadyToFire)),
            (CataGraph::Reloading, CataMessage::Fire, Some(CataId::Firing)),
            (CataGraph::Reloading, CataMessage::DisableCata, Some(CataId::CataOff)),
            (CataGraph::ReadyToFire, CataMessage::Fire, Some(CataId::Firing)),
            (CataGraph::ReadyToFire, CataMessage::Slipped, Some(CataId::Reloading)),
            (CataGraph::ReadyToFire, CataMessage::DisableCata, Some(CataId::CataOff)),
            (CataGraph::Firing, CataMessage::DoneFiring, Some(CataId::Reloading)),
            (CataGraph::Firing, CataMessage::DisableCata, Some(CataId::CataOff)),
            (CataGraph::Firing, CataMessage::Fire, None),
        ];
        for (state, message, expected) in cases {
            let next = state.respond(&system, message).map(|s| s.id());
            assert_eq!(next, *expected, "from {:?} on {message:?}", state.id());
        }
    }

    #[test]
    fn warm_up_glitch_suspends_reload() {
        let sensor = SimAngleSensor::default(); // reads 0.0
        let motor = SimMotorGroup::new("cata");
        let mut engine = Engine::new(
            test_system(&sensor, &motor),
            CataGraph::initial(DropMode::Unnecessary),
        );

        engine.tick();
        engine.tick();
        assert_eq!(engine.current_state(), CataId::Reloading);
        assert_eq!(motor.last_voltage(), None, "no drive until a real reading");
    }

    #[test]
    fn reload_drives_arm_down_then_reports_ready() {
        let sensor = SimAngleSensor::default();
        let motor = SimMotorGroup::new("cata");
        let mut engine = Engine::new(
            test_system(&sensor, &motor),
            CataGraph::initial(DropMode::Unnecessary),
        );

        sensor.set_degrees(40.0);
        engine.tick();
        assert_eq!(engine.current_state(), CataId::Reloading);
        let volts = motor.last_voltage().expect("feedback output applied");
        assert!(volts > 0.0, "error is positive so drive is positive");

        // Arm reaches the ready window.
        sensor.set_degrees(99.5);
        engine.tick();
        assert_eq!(engine.current_state(), CataId::ReadyToFire);
        assert!(motor.stop_count() >= 1, "motor stopped on entry to ready");
    }

    #[test]
    fn fire_cycle_returns_to_reloading() {
        let sensor = SimAngleSensor::default();
        let motor = SimMotorGroup::new("cata");
        let mut engine = Engine::new(test_system(&sensor, &motor), CataGraph::ReadyToFire);
        sensor.set_degrees(100.0);

        engine.client().send_message(CataMessage::Fire);
        engine.tick();
        assert_eq!(engine.current_state(), CataId::Firing);
        assert_eq!(motor.last_voltage(), Some(12.0), "full voltage while firing");

        // Still above the release threshold: keep firing.
        sensor.set_degrees(60.0);
        engine.tick();
        assert_eq!(engine.current_state(), CataId::Firing);

        // Arm released.
        sensor.set_degrees(15.0);
        engine.tick();
        assert_eq!(engine.current_state(), CataId::Reloading);
    }

    #[test]
    fn slip_triggers_automatic_reload() {
        let sensor = SimAngleSensor::default();
        let motor = SimMotorGroup::new("cata");
        let mut engine = Engine::new(test_system(&sensor, &motor), CataGraph::ReadyToFire);

        // Within the window: no reaction.
        sensor.set_degrees(95.0);
        engine.tick();
        assert_eq!(engine.current_state(), CataId::ReadyToFire);

        // Ratchet slipped: arm drifted past the window.
        sensor.set_degrees(70.0);
        engine.tick();
        assert_eq!(engine.current_state(), CataId::Reloading);
    }

    #[test]
    fn slip_detection_ignores_warm_up_reading() {
        let sensor = SimAngleSensor::default(); // 0.0 is way outside the window
        let motor = SimMotorGroup::new("cata");
        let mut engine = Engine::new(test_system(&sensor, &motor), CataGraph::ReadyToFire);

        engine.tick();
        assert_eq!(engine.current_state(), CataId::ReadyToFire);
    }

    #[test]
    fn drop_sequence_waits_then_reloads() {
        let sensor = SimAngleSensor::default();
        let motor = SimMotorGroup::new("cata");
        let mut system = test_system(&sensor, &motor);
        system.tuning.drop_settle_ms = 20;
        let mut engine = Engine::new(system, CataGraph::initial(DropMode::Required));

        engine.client().send_message(CataMessage::StartDrop);
        engine.tick();
        assert_eq!(engine.current_state(), CataId::WaitingForDrop);

        engine.tick();
        assert_eq!(engine.current_state(), CataId::WaitingForDrop, "settle not elapsed");

        std::thread::sleep(Duration::from_millis(30));
        engine.tick();
        assert_eq!(engine.current_state(), CataId::Reloading);
    }

    #[test]
    fn intaking_allowed_requires_real_reading_past_safe_angle() {
        let sensor = SimAngleSensor::default();
        let motor = SimMotorGroup::new("cata");
        let system = test_system(&sensor, &motor);

        assert!(!system.intaking_allowed(), "0.0 reads as sensor warm-up");
        sensor.set_degrees(79.0);
        assert!(!system.intaking_allowed(), "arm too high");
        sensor.set_degrees(85.0);
        assert!(system.intaking_allowed());
    }

    #[test]
    fn intake_gate_tracks_sensor() {
        let sensor = SimAngleSensor::default();
        let gate = CataSystem::intake_gate(Arc::new(sensor.clone()), 80.0);

        assert!(!gate.test());
        sensor.set_degrees(90.0);
        assert!(gate.test());
    }

    #[test]
    fn snapshot_reflects_machine_and_sensor() {
        let sensor = SimAngleSensor::default();
        let motor = SimMotorGroup::new("cata");
        let engine = Engine::new(test_system(&sensor, &motor), CataGraph::ReadyToFire);
        let page = CataPage::new(engine.client(), Arc::new(sensor.clone()), 80.0);

        sensor.set_degrees(100.0);
        let snap = page.snapshot();
        assert_eq!(snap.state, CataId::ReadyToFire);
        assert!((snap.degrees - 100.0).abs() < f64::EPSILON);
        assert!(snap.intaking_allowed);
    }
}
