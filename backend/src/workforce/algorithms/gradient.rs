//! Hill climber with a trend-sized step
//!
//! Same direction rule and memory as [`HillClimber`], but the step grows
//! with the slope of profits over targets: far from the top the climber
//! takes long strides, near it single workers.

use crate::stats::LinearTrend;
use crate::workforce::algorithms::{HillClimber, MaximizationAlgorithm, TargetDecision, TargetObservation};
use crate::workforce::HeadcountOracle;
use serde::{Deserialize, Serialize};

/// Observations kept for the slope estimate
pub const DEFAULT_TREND_WINDOW: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientHillClimber {
    climber: HillClimber,
    trend: LinearTrend,
    gain: f64,
    max_step: u32,
}

impl GradientHillClimber {
    /// `gain` converts |Δprofits per worker| into workers per step; steps
    /// are capped at `max_step`
    ///
    /// # Panics
    /// Panics if `max_step` is zero
    pub fn new(
        weekly_fixed_costs: f64,
        min_workers: u32,
        max_workers: u32,
        gain: f64,
        max_step: u32,
    ) -> Self {
        assert!(max_step >= 1, "max step must be at least one worker");
        Self {
            climber: HillClimber::new(weekly_fixed_costs, min_workers, max_workers),
            trend: LinearTrend::new(DEFAULT_TREND_WINDOW),
            gain: gain.max(0.0),
            max_step,
        }
    }

    /// Step for the next move: one worker until the trend is identified
    pub fn step_size(&self) -> u32 {
        match self.trend.try_fit() {
            Some(fit) => {
                let raw = (fit.slope.abs() * self.gain).round();
                (raw as u32).clamp(1, self.max_step)
            }
            None => 1,
        }
    }

    pub fn climber(&self) -> &HillClimber {
        &self.climber
    }
}

impl MaximizationAlgorithm for GradientHillClimber {
    fn choose_worker_target(&mut self, observation: &TargetObservation) -> TargetDecision {
        self.trend
            .push(observation.current_target as f64, observation.new_profits);
        let step = self.step_size();
        self.climber.choose_with_step(observation, |_| step)
    }

    fn reset(&mut self, headcount: &dyn HeadcountOracle) {
        self.climber.reset(headcount);
        self.trend.clear();
    }

    fn turn_off(&mut self) {
        self.climber.turn_off();
        self.trend.clear();
    }

    fn name(&self) -> &'static str {
        "gradient_hill_climber"
    }
}
