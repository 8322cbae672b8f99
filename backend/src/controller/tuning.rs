//! Controller tuning helpers
//!
//! [`ItaeCounter`] scores a controller by the integral of time-weighted
//! absolute error. [`StickinessTuner`] uses that score to hill-climb the
//! controller's sampling speed: evaluate a window, move the speed, evaluate
//! again, keep moving while the score improves.

use crate::controller::{finite_or_zero, Controller};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Integral of time-weighted absolute error
///
/// The first `burn_in` observations are ignored; after that the t-th
/// observation contributes `t·|target − observed|`.
///
/// # Example
/// ```
/// use firm_control_core_rs::controller::ItaeCounter;
///
/// let mut itae = ItaeCounter::new(1);
/// itae.record(10.0, 0.0); // burn-in
/// itae.record(10.0, 8.0); // 1·2
/// itae.record(10.0, 13.0); // 2·3
/// assert_eq!(itae.value(), 8.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItaeCounter {
    burn_in: usize,
    seen: usize,
    value: f64,
}

impl ItaeCounter {
    pub fn new(burn_in: usize) -> Self {
        Self {
            burn_in,
            seen: 0,
            value: 0.0,
        }
    }

    pub fn record(&mut self, target: f64, observed: f64) {
        self.seen += 1;
        if self.seen <= self.burn_in {
            return;
        }
        let t = (self.seen - self.burn_in) as f64;
        self.value += finite_or_zero(t * (target - observed).abs());
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Observations seen, burn-in included
    pub fn observations(&self) -> usize {
        self.seen
    }

    pub fn reset(&mut self) {
        self.seen = 0;
        self.value = 0.0;
    }
}

/// Hill-climbs a controller's speed to minimise ITAE
///
/// Every `window` observations the tuner closes the evaluation, compares it
/// with the previous one and moves the speed by `step` in the direction that
/// lowered the score. The sensitivity `ΔITAE / Δspeed` is collapsed to zero
/// when it is not finite; a zero sensitivity keeps the previous direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickinessTuner {
    counter: ItaeCounter,
    window: usize,
    step: u32,
    max_speed: u32,
    direction: i64,
    previous: Option<(u32, f64)>,
}

impl StickinessTuner {
    /// # Panics
    /// Panics if `window` or `step` is zero
    pub fn new(window: usize, step: u32, max_speed: u32) -> Self {
        assert!(window > 0, "evaluation window must be positive");
        assert!(step > 0, "speed step must be positive");
        Self {
            counter: ItaeCounter::new(0),
            window,
            step,
            max_speed,
            direction: 1,
            previous: None,
        }
    }

    /// Feed one observation; returns the new speed when a window closes
    pub fn observe<C: Controller + ?Sized>(
        &mut self,
        controller: &mut C,
        target: f64,
        observed: f64,
    ) -> Option<u32> {
        self.counter.record(target, observed);
        if self.counter.observations() < self.window {
            return None;
        }
        let score = self.counter.value();
        self.counter.reset();

        let speed = controller.speed();
        if let Some((previous_speed, previous_score)) = self.previous {
            let sensitivity =
                finite_or_zero((score - previous_score) / (speed as f64 - previous_speed as f64));
            if sensitivity > 0.0 {
                self.direction = -1;
            } else if sensitivity < 0.0 {
                self.direction = 1;
            }
        }
        self.previous = Some((speed, score));

        let next = (speed as i64 + self.direction * self.step as i64).clamp(0, self.max_speed as i64);
        let next = next as u32;
        debug!(speed, next, score, "stickiness tuner moved speed");
        controller.set_speed(next);
        Some(next)
    }

    /// Last closed window: (speed, score)
    pub fn last_evaluation(&self) -> Option<(u32, f64)> {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{PidController, PidGains};

    #[test]
    fn test_burn_in_ignored() {
        let mut itae = ItaeCounter::new(3);
        for _ in 0..3 {
            itae.record(100.0, 0.0);
        }
        assert_eq!(itae.value(), 0.0);
        itae.record(1.0, 0.0);
        assert_eq!(itae.value(), 1.0);
    }

    #[test]
    fn test_first_window_steps_up() {
        let mut pid = PidController::new(PidGains::default());
        let mut tuner = StickinessTuner::new(5, 1, 10);
        let moves: Vec<Option<u32>> = (0..5).map(|_| tuner.observe(&mut pid, 1.0, 0.0)).collect();
        assert_eq!(moves, vec![None, None, None, None, Some(1)]);
        assert_eq!(pid.speed(), 1);
    }

    #[test]
    fn test_worse_score_reverses_direction() {
        let mut pid = PidController::new(PidGains::default());
        let mut tuner = StickinessTuner::new(2, 1, 10);
        tuner.observe(&mut pid, 1.0, 0.0);
        assert_eq!(tuner.observe(&mut pid, 1.0, 0.0), Some(1));
        // larger errors at speed 1: go back down
        tuner.observe(&mut pid, 5.0, 0.0);
        assert_eq!(tuner.observe(&mut pid, 5.0, 0.0), Some(0));
    }

    #[test]
    fn test_flat_objective_never_produces_nan() {
        let mut pid = PidController::new(PidGains::default());
        let mut tuner = StickinessTuner::new(1, 1, 0);
        for _ in 0..10 {
            // max speed 0 pins the speed, so Δspeed is zero every window
            assert_eq!(tuner.observe(&mut pid, 1.0, 1.0), Some(0));
        }
        let (_, score) = tuner.last_evaluation().unwrap();
        assert!(score.is_finite());
    }
}
