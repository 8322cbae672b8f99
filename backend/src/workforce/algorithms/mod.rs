//! Worker-target maximization algorithms
//!
//! An algorithm sees the profits made at the current target and at the
//! previously committed one, and proposes the next target. It never
//! schedules anything; the maximizer embedding it decides when to ask.

pub mod fixed;
pub mod gradient;
pub mod hill_climber;
pub mod marginal;

use crate::workforce::HeadcountOracle;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use fixed::FixedTarget;
pub use gradient::GradientHillClimber;
pub use hill_climber::HillClimber;
pub use marginal::MarginalMaximizer;

/// Everything an algorithm is told when asked for a new target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetObservation {
    pub current_target: u32,
    pub new_profits: f64,
    pub new_revenues: f64,
    pub new_costs: f64,
    pub old_revenues: f64,
    pub old_costs: f64,
    pub old_target: u32,
    pub old_profits: f64,
}

/// An algorithm's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "target", rename_all = "snake_case")]
pub enum TargetDecision {
    /// Commit this target (it may equal the current one)
    Retarget(u32),
    /// Observe for another cycle before deciding
    NeedMoreTime,
}

pub trait MaximizationAlgorithm: fmt::Debug + Send {
    fn choose_worker_target(&mut self, observation: &TargetObservation) -> TargetDecision;

    /// Forget what was learned; called when the plant's technology changes
    fn reset(&mut self, headcount: &dyn HeadcountOracle);

    fn turn_off(&mut self) {}

    fn name(&self) -> &'static str;
}

/// Sign of a float as -1, 0 or 1 (NaN is 0)
pub(crate) fn signum(value: f64) -> i64 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}
