//! Generic `MotorGroup` trait for one or more mechanically linked
//! motors driven as a unit (the catapult winch pair, the intake
//! roller).
//!
//! The core treats these as synchronous, non-blocking calls with
//! bounded latency.  Hardware referenced by a resident state machine
//! state is exclusively driven by that machine's task; external code
//! must not actuate the same motors concurrently.

use sling_types::SlingError;

/// A voltage-controlled motor group.
pub trait MotorGroup: Send {
    /// Stable identifier for this group, e.g. `"cata_motors"`.
    fn id(&self) -> &str;

    /// Apply `volts` to every motor in the group.  Positive values
    /// drive the mechanism in its primary direction.
    ///
    /// # Errors
    ///
    /// Returns [`SlingError::HardwareFault`] if the command cannot be
    /// applied (disconnected port, over-temperature cutoff).
    fn set_voltage(&mut self, volts: f64) -> Result<(), SlingError>;

    /// Cut power to the group.
    ///
    /// # Errors
    ///
    /// Returns [`SlingError::HardwareFault`] if the command cannot be
    /// applied.
    fn stop(&mut self) -> Result<(), SlingError>;

    /// Measured velocity of the group in RPM.  Used for stall
    /// detection; sign follows the commanded direction.
    fn velocity(&self) -> f64;
}
