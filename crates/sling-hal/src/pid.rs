//! PID (Proportional–Integral–Derivative) controller implementing the
//! [`Feedback`] contract.
//!
//! The controller is tick-normalised: every [`update`][Feedback::update]
//! counts as one control period, so gains are tuned for the loop rate
//! the owning state machine runs at.  This keeps behaviour fully
//! deterministic under test – no wall clock is involved.
//!
//! # Example
//!
//! ```rust
//! use sling_hal::{Feedback, PidController};
//!
//! let mut pid = PidController::new(0.5, 0.0, 0.0).with_target_window(2.0);
//! pid.init(90.0, 0.0);
//! pid.update(40.0);
//! assert!(pid.output() > 0.0); // drives the mechanism toward 90°
//! assert!(!pid.is_on_target());
//! pid.update(89.0);
//! assert!(pid.is_on_target());
//! ```

use tracing::debug;

use crate::feedback::Feedback;

/// A tunable PID controller for closed-loop position control.
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    target: f64,
    integral: f64,
    last_error: Option<f64>,
    output: f64,
    output_min: f64,
    output_max: f64,
    target_window: f64,
}

impl PidController {
    /// Create a new controller with the given per-tick gains.
    ///
    /// Output is unclamped by default and the on-target window is
    /// `1.0` unit.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            target: 0.0,
            integral: 0.0,
            last_error: None,
            output: 0.0,
            output_min: f64::NEG_INFINITY,
            output_max: f64::INFINITY,
            target_window: 1.0,
        }
    }

    /// Clamp the output (and integral wind-up) to `[min, max]`.
    pub fn with_output_limits(mut self, min: f64, max: f64) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }

    /// Set the absolute error below which the controller reports
    /// on-target.
    pub fn with_target_window(mut self, window: f64) -> Self {
        self.target_window = window;
        self
    }

    /// Update the proportional, integral, and derivative gains.
    ///
    /// Takes effect on the next [`update`][Feedback::update]; the
    /// integral and error history are kept.
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        debug!(kp, ki, kd, "pid gains retuned");
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }
}

impl Feedback for PidController {
    fn init(&mut self, target: f64, current: f64) {
        self.target = target;
        self.integral = 0.0;
        self.last_error = Some(target - current);
        self.output = 0.0;
    }

    fn update(&mut self, measurement: f64) {
        let error = self.target - measurement;

        let p = self.kp * error;

        // Integral term with anti-windup clamping.
        self.integral += error;
        let i = (self.ki * self.integral).clamp(self.output_min, self.output_max);
        if self.ki.abs() > f64::EPSILON {
            self.integral = i / self.ki;
        }

        // Backward-difference derivative.
        let d = match self.last_error {
            Some(prev) => self.kd * (error - prev),
            None => 0.0,
        };
        self.last_error = Some(error);

        self.output = (p + i + d).clamp(self.output_min, self.output_max);
    }

    fn output(&self) -> f64 {
        self.output
    }

    fn is_on_target(&self) -> bool {
        match self.last_error {
            Some(error) => error.abs() <= self.target_window,
            None => false,
        }
    }
}
