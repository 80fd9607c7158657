//! In-process simulated hardware for headless testing.
//!
//! The stubs record every command and expose settable readings, so the
//! full control stack (commands, controller, state machines) runs in
//! CI without any physical hardware.  Both stubs are `Clone`: clones
//! share state, letting a test keep an observation handle while the
//! system under test owns the "device".
//!
//! # Example
//!
//! ```rust
//! use sling_hal::{MotorGroup, SimMotorGroup};
//!
//! let mut motor = SimMotorGroup::new("cata_motors");
//! let probe = motor.clone();
//!
//! motor.set_voltage(12.0).unwrap();
//! assert_eq!(probe.last_voltage(), Some(12.0));
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use sling_types::SlingError;

use crate::motor::MotorGroup;
use crate::sensor::AngleSensor;

// ────────────────────────────────────────────────────────────────────────────
// Simulated motor group
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MotorReadout {
    last_voltage: Option<f64>,
    stop_count: usize,
    velocity: f64,
}

/// A simulated [`MotorGroup`] that records the most recent commanded
/// voltage and every stop.  Always succeeds.
#[derive(Clone)]
pub struct SimMotorGroup {
    id: String,
    readout: Arc<Mutex<MotorReadout>>,
}

impl SimMotorGroup {
    /// Create a new simulated motor group with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            readout: Arc::new(Mutex::new(MotorReadout::default())),
        }
    }

    fn readout(&self) -> std::sync::MutexGuard<'_, MotorReadout> {
        self.readout.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The most recent commanded voltage, or `None` if the group was
    /// never driven (or was stopped since).
    pub fn last_voltage(&self) -> Option<f64> {
        self.readout().last_voltage
    }

    /// How many times [`MotorGroup::stop`] has been called.
    pub fn stop_count(&self) -> usize {
        self.readout().stop_count
    }

    /// Set the velocity the simulated encoder reports.
    pub fn set_velocity(&self, rpm: f64) {
        self.readout().velocity = rpm;
    }
}

impl MotorGroup for SimMotorGroup {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_voltage(&mut self, volts: f64) -> Result<(), SlingError> {
        self.readout().last_voltage = Some(volts);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SlingError> {
        let mut readout = self.readout();
        readout.last_voltage = None;
        readout.stop_count += 1;
        readout.velocity = 0.0;
        Ok(())
    }

    fn velocity(&self) -> f64 {
        self.readout().velocity
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated angle sensor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated [`AngleSensor`] with an externally settable reading.
///
/// Defaults to `0.0` – the warm-up sentinel – so a freshly constructed
/// sensor behaves like a potentiometer that has not stabilised yet.
#[derive(Clone)]
pub struct SimAngleSensor(Arc<Mutex<f64>>);

impl SimAngleSensor {
    /// Create a sensor reporting `degrees`.
    pub fn new(degrees: f64) -> Self {
        Self(Arc::new(Mutex::new(degrees)))
    }

    /// Change the reading all clones report.
    pub fn set_degrees(&self, degrees: f64) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = degrees;
    }
}

impl Default for SimAngleSensor {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl AngleSensor for SimAngleSensor {
    fn degrees(&self) -> f64 {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_motor_records_voltage() {
        let mut motor = SimMotorGroup::new("test");
        assert_eq!(motor.last_voltage(), None);
        motor.set_voltage(6.5).unwrap();
        assert_eq!(motor.last_voltage(), Some(6.5));
        assert_eq!(motor.id(), "test");
    }

    #[test]
    fn sim_motor_stop_clears_voltage_and_velocity() {
        let mut motor = SimMotorGroup::new("test");
        motor.set_voltage(6.5).unwrap();
        motor.set_velocity(100.0);
        motor.stop().unwrap();
        assert_eq!(motor.last_voltage(), None);
        assert_eq!(motor.stop_count(), 1);
        assert!(motor.velocity().abs() < f64::EPSILON);
    }

    #[test]
    fn sim_motor_clones_share_state() {
        let mut motor = SimMotorGroup::new("shared");
        let probe = motor.clone();
        motor.set_voltage(-3.0).unwrap();
        assert_eq!(probe.last_voltage(), Some(-3.0));
    }

    #[test]
    fn sim_sensor_defaults_to_warmup_sentinel() {
        let sensor = SimAngleSensor::default();
        assert!(sensor.degrees().abs() < f64::EPSILON);
    }

    #[test]
    fn sim_sensor_clones_share_reading() {
        let sensor = SimAngleSensor::new(10.0);
        let clone = sensor.clone();
        sensor.set_degrees(95.0);
        assert!((clone.degrees() - 95.0).abs() < f64::EPSILON);
    }
}
