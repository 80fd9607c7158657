//! Generic `AngleSensor` trait for absolute-position sensors
//! (potentiometers, rotation sensors) attached to a mechanism.
//!
//! Reads are `&self` so a sensor handle can be shared between a state
//! machine's background task and external safety queries (the intake
//! gate reads the catapult sensor without any state-machine
//! round-trip).  Implementations use interior mutability if the
//! underlying driver needs it.

/// An absolute angle sensor.
pub trait AngleSensor: Send + Sync {
    /// Current mechanism angle in degrees.
    ///
    /// An exact `0.0` is the warm-up sentinel: potentiometers read zero
    /// for the first few milliseconds after power-up.  Consumers treat
    /// it as "no reading yet" and retry on the next tick rather than
    /// acting on it.
    fn degrees(&self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSensor(f64);

    impl AngleSensor for FixedSensor {
        fn degrees(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn fixed_sensor_reports_its_angle() {
        let sensor = FixedSensor(87.5);
        assert!((sensor.degrees() - 87.5).abs() < f64::EPSILON);
    }
}
