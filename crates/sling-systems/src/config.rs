//! Robot tuning configuration – reads/writes `sling.toml`.
//!
//! Every field has a serde default so a partial file (or no file at
//! all) yields a runnable configuration.  Invalid tuning updates are
//! rejected as logged no-ops, never faults: a competition device
//! cannot afford to halt over a bad number.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sling_types::SlingError;
use tracing::warn;

use crate::cata::DropMode;

// ────────────────────────────────────────────────────────────────────────────
// Catapult tuning
// ────────────────────────────────────────────────────────────────────────────

/// Angles (degrees), voltages, and timing for the catapult.
///
/// The potentiometer reads higher as the arm is drawn down: the ready
/// (cocked) position sits near `ready_angle`, and a released arm
/// swings up past `fired_angle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CataTuning {
    /// Arm angle when cocked and ready to fire.
    #[serde(default = "default_ready_angle")]
    pub ready_angle: f64,
    /// Angle at or below which a shot counts as released.
    #[serde(default = "default_fired_angle")]
    pub fired_angle: f64,
    /// Allowed drift around `ready_angle` before the arm counts as
    /// slipped.
    #[serde(default = "default_slip_window")]
    pub slip_window: f64,
    /// Minimum arm angle at which the intake can run without jamming
    /// into the catapult.
    #[serde(default = "default_intake_safe_angle")]
    pub intake_safe_angle: f64,
    /// Voltage applied while firing.
    #[serde(default = "default_fire_voltage")]
    pub fire_voltage: f64,
    /// How long the mechanism is given to settle after the match-start
    /// drop before reloading begins.
    #[serde(default = "default_drop_settle_ms")]
    pub drop_settle_ms: u64,
}

impl CataTuning {
    /// Drop-settle time as a [`Duration`].
    pub fn drop_settle(&self) -> Duration {
        Duration::from_millis(self.drop_settle_ms)
    }

    /// Update the ready and fired angles together.
    ///
    /// Two identical angles would collapse the ready window onto the
    /// release threshold, so the update is logged and ignored, leaving
    /// the prior configuration intact.
    pub fn set_angles(&mut self, ready: f64, fired: f64) {
        if !ready.is_finite() || !fired.is_finite() {
            warn!(ready, fired, "non-finite catapult angles rejected");
            return;
        }
        if (ready - fired).abs() < f64::EPSILON {
            warn!(
                ready,
                fired, "identical ready and fired angles rejected; keeping prior tuning"
            );
            return;
        }
        self.ready_angle = ready;
        self.fired_angle = fired;
    }
}

impl Default for CataTuning {
    fn default() -> Self {
        Self {
            ready_angle: default_ready_angle(),
            fired_angle: default_fired_angle(),
            slip_window: default_slip_window(),
            intake_safe_angle: default_intake_safe_angle(),
            fire_voltage: default_fire_voltage(),
            drop_settle_ms: default_drop_settle_ms(),
        }
    }
}

fn default_ready_angle() -> f64 {
    100.0
}
fn default_fired_angle() -> f64 {
    20.0
}
fn default_slip_window() -> f64 {
    10.0
}
fn default_intake_safe_angle() -> f64 {
    80.0
}
fn default_fire_voltage() -> f64 {
    12.0
}
fn default_drop_settle_ms() -> u64 {
    500
}

// ────────────────────────────────────────────────────────────────────────────
// Intake tuning
// ────────────────────────────────────────────────────────────────────────────

/// Voltages and timing for the intake roller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeTuning {
    /// Voltage while intaking.
    #[serde(default = "default_intake_voltage")]
    pub intake_voltage: f64,
    /// Voltage while outtaking / clearing a jam (negative = reverse).
    #[serde(default = "default_outtake_voltage")]
    pub outtake_voltage: f64,
    /// Measured RPM below which a driven roller counts as stalled.
    #[serde(default = "default_stall_velocity")]
    pub stall_velocity: f64,
    /// Grace period after the roller starts before stall detection
    /// arms.
    #[serde(default = "default_spin_up_ms")]
    pub spin_up_ms: u64,
    /// How long to reverse when clearing a jam.
    #[serde(default = "default_unjam_ms")]
    pub unjam_ms: u64,
}

impl IntakeTuning {
    /// Spin-up grace period as a [`Duration`].
    pub fn spin_up(&self) -> Duration {
        Duration::from_millis(self.spin_up_ms)
    }

    /// Jam back-off interval as a [`Duration`].
    pub fn unjam(&self) -> Duration {
        Duration::from_millis(self.unjam_ms)
    }
}

impl Default for IntakeTuning {
    fn default() -> Self {
        Self {
            intake_voltage: default_intake_voltage(),
            outtake_voltage: default_outtake_voltage(),
            stall_velocity: default_stall_velocity(),
            spin_up_ms: default_spin_up_ms(),
            unjam_ms: default_unjam_ms(),
        }
    }
}

fn default_intake_voltage() -> f64 {
    9.0
}
fn default_outtake_voltage() -> f64 {
    -9.0
}
fn default_stall_velocity() -> f64 {
    5.0
}
fn default_spin_up_ms() -> u64 {
    250
}
fn default_unjam_ms() -> u64 {
    300
}

// ────────────────────────────────────────────────────────────────────────────
// Robot configuration
// ────────────────────────────────────────────────────────────────────────────

/// Whole-robot configuration persisted as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default)]
    pub cata: CataTuning,
    #[serde(default)]
    pub intake: IntakeTuning,
    /// State-machine and controller tick period.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Whether the catapult must perform the match-start drop.
    #[serde(default)]
    pub drop_mode: DropMode,
}

fn default_tick_ms() -> u64 {
    10
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            cata: CataTuning::default(),
            intake: IntakeTuning::default(),
            tick_ms: default_tick_ms(),
            drop_mode: DropMode::default(),
        }
    }
}

impl RobotConfig {
    /// Tick period as a [`Duration`].
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Load a config from `path`.  Returns `Ok(None)` if the file does not
/// exist; env-var overrides are applied to whatever was loaded.
pub fn load_from(path: &Path) -> Result<Option<RobotConfig>, SlingError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        SlingError::ConfigIo(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let mut config: RobotConfig = toml::from_str(&raw)
        .map_err(|e| SlingError::ConfigIo(format!("failed to parse config: {e}")))?;
    apply_env_overrides(&mut config);
    Ok(Some(config))
}

/// Save `config` to `path`, creating parent directories as needed.
pub fn save_to(config: &RobotConfig, path: &Path) -> Result<(), SlingError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SlingError::ConfigIo(format!("failed to create config directory: {e}"))
        })?;
    }
    let raw = toml::to_string_pretty(config)
        .map_err(|e| SlingError::ConfigIo(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        SlingError::ConfigIo(format!("failed to write config at {}: {e}", path.display()))
    })
}

/// Apply `SLING_*` environment variable overrides to `config`.
///
/// | Variable | Config field |
/// |---|---|
/// | `SLING_TICK_MS` | `tick_ms` |
/// | `SLING_FIRE_VOLTAGE` | `cata.fire_voltage` |
pub fn apply_env_overrides(config: &mut RobotConfig) {
    if let Ok(v) = std::env::var("SLING_TICK_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        config.tick_ms = ms;
    }
    if let Ok(v) = std::env::var("SLING_FIRE_VOLTAGE")
        && let Ok(volts) = v.parse::<f64>()
    {
        config.cata.fire_voltage = volts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_runnable() {
        let config = RobotConfig::default();
        assert_eq!(config.tick(), Duration::from_millis(10));
        assert!(config.cata.ready_angle > config.cata.fired_angle);
        assert!(config.intake.intake_voltage > 0.0);
        assert!(config.intake.outtake_voltage < 0.0);
    }

    #[test]
    fn set_angles_updates_valid_pair() {
        let mut tuning = CataTuning::default();
        tuning.set_angles(110.0, 25.0);
        assert!((tuning.ready_angle - 110.0).abs() < f64::EPSILON);
        assert!((tuning.fired_angle - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn set_angles_rejects_identical_pair_as_noop() {
        let mut tuning = CataTuning::default();
        let before = tuning.clone();
        tuning.set_angles(50.0, 50.0);
        assert!((tuning.ready_angle - before.ready_angle).abs() < f64::EPSILON);
        assert!((tuning.fired_angle - before.fired_angle).abs() < f64::EPSILON);
    }

    #[test]
    fn set_angles_rejects_non_finite_values() {
        let mut tuning = CataTuning::default();
        tuning.set_angles(f64::NAN, 20.0);
        assert!((tuning.ready_angle - default_ready_angle()).abs() < f64::EPSILON);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("sling.toml");

        let config = RobotConfig::default();
        save_to(&config, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.tick_ms, 10);
        assert!((loaded.cata.ready_angle - 100.0).abs() < f64::EPSILON);
        assert_eq!(loaded.intake.spin_up_ms, 250);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let result = load_from(&dir.path().join("absent.toml")).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("sling.toml");
        fs::write(&path, "tick_ms = 5\n[cata]\nfire_voltage = 10.0\n").expect("write");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.tick_ms, 5);
        assert!((loaded.cata.fire_voltage - 10.0).abs() < f64::EPSILON);
        // Unspecified fields keep their defaults.
        assert!((loaded.cata.ready_angle - 100.0).abs() < f64::EPSILON);
        assert_eq!(loaded.intake.unjam_ms, 300);
    }

    #[test]
    fn env_override_changes_tick() {
        // SAFETY: single-threaded test; no other thread reads this env-var.
        unsafe { std::env::set_var("SLING_TICK_MS", "2") };
        let mut config = RobotConfig::default();
        apply_env_overrides(&mut config);
        assert_eq!(config.tick_ms, 2);
        unsafe { std::env::remove_var("SLING_TICK_MS") };
    }

    #[test]
    fn env_override_ignores_invalid_value() {
        // SAFETY: single-threaded test; no other thread reads this env-var.
        unsafe { std::env::set_var("SLING_FIRE_VOLTAGE", "not-a-number") };
        let mut config = RobotConfig::default();
        apply_env_overrides(&mut config);
        assert!((config.cata.fire_voltage - 12.0).abs() < f64::EPSILON);
        unsafe { std::env::remove_var("SLING_FIRE_VOLTAGE") };
    }
}
