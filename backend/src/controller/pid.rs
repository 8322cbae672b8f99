//! PID controller
//!
//! `MV = offset + Kp·e + Ki·Σe + Kd·Δe`, where `e = target − measured`.
//!
//! Two refinements over the textbook form:
//!
//! - **Stickiness**: with speed `n`, only every `(n+1)`-th call to
//!   [`PidController::adjust`] recomputes the MV. The caller can invoke the
//!   controller every day while the output moves less often.
//! - **Anti-windup**: while windup stop is on, the error is not added to the
//!   integral when the unclamped output would be negative, so a controller
//!   pinned at zero does not accumulate an ever-growing debt.

use crate::controller::{finite_or_zero, Controller, ControllerError, ControllerInput};
use serde::{Deserialize, Serialize};

/// Range an MV is clamped to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissibleRange {
    /// Monetary values: never below zero
    #[default]
    NonNegative,
    /// No clamping
    Unbounded,
}

impl AdmissibleRange {
    pub fn clamp(&self, value: f64) -> f64 {
        match self {
            AdmissibleRange::NonNegative => value.max(0.0),
            AdmissibleRange::Unbounded => value,
        }
    }
}

/// Proportional, integral and derivative gains
///
/// Gains are floored at zero wherever they enter a controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub proportional: f64,
    pub integral: f64,
    pub derivative: f64,
}

impl PidGains {
    pub fn new(proportional: f64, integral: f64, derivative: f64) -> Self {
        Self {
            proportional,
            integral,
            derivative,
        }
    }

    /// The same gains with every negative (or NaN) component set to zero
    pub fn floored(self) -> Self {
        let floor = |g: f64| if g > 0.0 { g } else { 0.0 };
        Self {
            proportional: floor(self.proportional),
            integral: floor(self.integral),
            derivative: floor(self.derivative),
        }
    }
}

impl Default for PidGains {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// PID controller with sampling speed and anti-windup
///
/// # Example
/// ```
/// use firm_control_core_rs::controller::{PidController, PidGains};
///
/// let mut pid = PidController::new(PidGains::new(0.5, 0.1, 0.0));
/// pid.set_offset(10.0);
/// assert!(pid.adjust(5.0, 3.0, true));
/// // 10 + 0.5·2 + 0.1·2
/// assert!((pid.current_mv() - 11.2).abs() < 1e-9);
///
/// // inactive controllers never move
/// assert!(!pid.adjust(100.0, 0.0, false));
/// assert!((pid.current_mv() - 11.2).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidController {
    gains: PidGains,
    integral: f64,
    old_error: Option<f64>,
    new_error: Option<f64>,
    offset: f64,
    current_mv: f64,
    speed: u32,
    countdown: u32,
    windup_stop: bool,
    range: AdmissibleRange,
}

impl PidController {
    /// New controller with zero offset, speed 0, windup stop on and a
    /// non-negative MV
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains: gains.floored(),
            integral: 0.0,
            old_error: None,
            new_error: None,
            offset: 0.0,
            current_mv: 0.0,
            speed: 0,
            countdown: 0,
            windup_stop: true,
            range: AdmissibleRange::NonNegative,
        }
    }

    /// Builder-style speed setter
    pub fn with_speed(mut self, speed: u32) -> Self {
        self.set_speed(speed);
        self
    }

    /// Builder-style admissible range setter
    pub fn with_range(mut self, range: AdmissibleRange) -> Self {
        self.range = range;
        self
    }

    /// Builder-style windup stop setter
    pub fn with_windup_stop(mut self, windup_stop: bool) -> Self {
        self.windup_stop = windup_stop;
        self
    }

    /// Sample `target − measured`
    pub fn adjust(&mut self, target: f64, measured: f64, active: bool) -> bool {
        self.adjust_residual(target - measured, active)
    }

    /// Sample an already computed error
    pub fn adjust_residual(&mut self, residual: f64, active: bool) -> bool {
        if !active {
            return false;
        }
        if self.countdown > 0 {
            self.countdown -= 1;
            return false;
        }
        self.countdown = self.speed;

        self.old_error = self.new_error;
        self.new_error = Some(residual);

        let derivative = match self.old_error {
            Some(old) => finite_or_zero(residual - old),
            None => 0.0,
        };

        if !self.windup_stop || self.formula(residual, derivative) >= 0.0 {
            self.integral += residual;
        }

        self.current_mv = self.range.clamp(self.formula(residual, derivative));
        true
    }

    fn formula(&self, error: f64, derivative: f64) -> f64 {
        self.offset
            + self.gains.proportional * error
            + self.gains.integral * self.integral
            + self.gains.derivative * derivative
    }

    pub fn current_mv(&self) -> f64 {
        self.current_mv
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Restart the controller from `offset`: integral and error history are
    /// cleared and the MV jumps to the offset
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
        self.integral = 0.0;
        self.old_error = None;
        self.new_error = None;
        self.current_mv = self.range.clamp(offset);
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Replace the gains; negative gains are floored at zero
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains.floored();
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Change the sampling speed; a pending countdown never exceeds the new
    /// speed
    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed;
        self.countdown = self.countdown.min(speed);
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn new_error(&self) -> Option<f64> {
        self.new_error
    }

    pub fn old_error(&self) -> Option<f64> {
        self.old_error
    }

    pub fn windup_stop(&self) -> bool {
        self.windup_stop
    }

    pub fn set_windup_stop(&mut self, windup_stop: bool) {
        self.windup_stop = windup_stop;
    }

    pub fn range(&self) -> AdmissibleRange {
        self.range
    }

    pub fn set_range(&mut self, range: AdmissibleRange) {
        self.range = range;
    }
}

impl Controller for PidController {
    fn adjust_input(
        &mut self,
        input: &ControllerInput,
        active: bool,
    ) -> Result<bool, ControllerError> {
        let target = input.target(0)?;
        let measured = input.input(0)?;
        Ok(self.adjust(target, measured, active))
    }

    fn current_mv(&self) -> f64 {
        self.current_mv
    }

    fn offset(&self) -> f64 {
        self.offset
    }

    fn set_offset(&mut self, offset: f64) {
        PidController::set_offset(self, offset)
    }

    fn speed(&self) -> u32 {
        self.speed
    }

    fn set_speed(&mut self, speed: u32) {
        PidController::set_speed(self, speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_has_no_derivative() {
        let mut pid = PidController::new(PidGains::new(0.0, 0.0, 5.0));
        pid.set_offset(1.0);
        pid.adjust(10.0, 0.0, true);
        assert_eq!(pid.current_mv(), 1.0);
        pid.adjust(10.0, 4.0, true);
        // Δe = 6 − 10
        assert_eq!(pid.current_mv(), 0.0);
    }

    #[test]
    fn test_negative_gains_floored() {
        let pid = PidController::new(PidGains::new(-1.0, 0.5, -0.2));
        assert_eq!(pid.gains(), PidGains::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_mv_clamped_non_negative() {
        let mut pid = PidController::new(PidGains::new(1.0, 0.0, 0.0));
        pid.adjust(0.0, 50.0, true);
        assert_eq!(pid.current_mv(), 0.0);
    }

    #[test]
    fn test_unbounded_range_goes_negative() {
        let mut pid =
            PidController::new(PidGains::new(1.0, 0.0, 0.0)).with_range(AdmissibleRange::Unbounded);
        pid.adjust(0.0, 50.0, true);
        assert_eq!(pid.current_mv(), -50.0);
    }

    #[test]
    fn test_windup_stop_freezes_integral_at_saturation() {
        let mut pid = PidController::new(PidGains::new(0.0, 1.0, 0.0));
        for _ in 0..10 {
            pid.adjust(0.0, 5.0, true);
        }
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.current_mv(), 0.0);

        let mut winding = PidController::new(PidGains::new(0.0, 1.0, 0.0)).with_windup_stop(false);
        for _ in 0..10 {
            winding.adjust(0.0, 5.0, true);
        }
        assert_eq!(winding.integral(), -50.0);
        assert_eq!(winding.current_mv(), 0.0);
    }

    #[test]
    fn test_speed_throttles_recomputation() {
        let mut pid = PidController::new(PidGains::new(1.0, 0.0, 0.0)).with_speed(2);
        let recomputed: Vec<bool> = (0..7).map(|_| pid.adjust(1.0, 0.0, true)).collect();
        assert_eq!(recomputed, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn test_set_offset_resets_history() {
        let mut pid = PidController::new(PidGains::new(1.0, 1.0, 1.0));
        pid.adjust(5.0, 0.0, true);
        pid.adjust(5.0, 1.0, true);
        pid.set_offset(7.0);
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.new_error(), None);
        assert_eq!(pid.current_mv(), 7.0);
    }

    #[test]
    fn test_packed_input_matches_explicit() {
        let gains = PidGains::new(0.3, 0.05, 0.1);
        let mut explicit = PidController::new(gains);
        let mut packed = PidController::new(gains);
        for (t, m) in [(10.0, 2.0), (10.0, 6.0), (12.0, 11.0), (8.0, 9.0)] {
            explicit.adjust(t, m, true);
            packed
                .adjust_input(&ControllerInput::simple(t, m), true)
                .unwrap();
            assert_eq!(explicit.current_mv(), packed.current_mv());
        }
    }
}
