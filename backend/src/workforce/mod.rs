//! Two-timescale workforce target control
//!
//! A plant's hiring is driven by two loops running on the same scheduler:
//!
//! - the **targeter** ([`PidTargeter`]) runs every day and moves the wage
//!   with a PID controller until headcount matches the current target;
//! - the **maximizer** runs on a slow, jittered schedule and decides what
//!   the target should be by comparing profits before and after each
//!   re-target. [`SetTargetThenRetryMaximizer`] waits for the targeter to
//!   reach the target and for the rest of the firm to settle before it looks
//!   at profits; [`PeriodicMaximizer`] and [`FullCapacityMaximizer`] are
//!   the simpler alternatives.
//!
//! The components never own the plant or the firm. They see them through
//! the small oracle traits defined here and reschedule themselves through an
//! [`Agenda`](crate::scheduler::Agenda).

pub mod algorithms;
pub mod control;
pub mod full_capacity;
pub mod maximizer;
pub mod periodic;
pub mod registry;
pub mod targeter;

use crate::rng::RngManager;
use crate::scheduler::{Agenda, ScheduleError};
use crate::core::time::{Phase, Priority};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use algorithms::{
    FixedTarget, GradientHillClimber, HillClimber, MarginalMaximizer, MaximizationAlgorithm,
    TargetDecision, TargetObservation,
};
pub use control::{PlantControl, WorkforceControl};
pub use full_capacity::FullCapacityMaximizer;
pub use maximizer::{MaximizerStage, SetTargetThenRetryMaximizer};
pub use periodic::PeriodicMaximizer;
pub use registry::{AlgorithmContext, AlgorithmRegistry, StrategyRegistry};
pub use targeter::PidTargeter;

/// Errors raised by workforce control
#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("Component already turned off")]
    AlreadyTurnedOff,

    #[error("Wage must be non-negative, got {0}")]
    NegativeWage(i64),

    #[error("Worker target {target} outside [0, {max}]")]
    TargetOutOfRange { target: u32, max: u32 },

    #[error("Scheduling failed: {0}")]
    Schedule(#[from] ScheduleError),
}

/// Read-only view of the plant's workforce
pub trait HeadcountOracle {
    /// Workers currently employed
    fn workers(&self) -> u32;

    /// Smallest non-zero workforce the technology can run with
    fn min_workers(&self) -> u32 {
        0
    }

    /// Technological maximum
    fn max_workers(&self) -> u32;

    fn weekly_fixed_costs(&self) -> f64 {
        0.0
    }
}

/// Plant accounting, consulted only when a maximizer observes
pub trait ProfitOracle {
    fn profits(&self) -> f64;
    fn revenues(&self) -> f64;
    fn costs(&self) -> f64;
}

/// Where the targeter installs its wage
pub trait WageSetter {
    fn current_wage(&self) -> i64;
    fn set_wage(&mut self, wage: i64);
}

/// Holder of the current worker target
pub trait WorkforceTargeter {
    fn target(&self) -> u32;
    fn set_target(&mut self, target: u32);
}

/// Profits, revenues and costs at one instant, plus the target in force
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitSnapshot {
    pub profits: f64,
    pub revenues: f64,
    pub costs: f64,
    pub target: u32,
}

impl ProfitSnapshot {
    pub fn read(profits: &dyn ProfitOracle, target: u32) -> Self {
        Self {
            profits: profits.profits(),
            revenues: profits.revenues(),
            costs: profits.costs(),
            target,
        }
    }
}

/// Fail unless `target` lies in `[0, max workers]`
pub fn validate_target(target: u32, headcount: &dyn HeadcountOracle) -> Result<(), ControlError> {
    let max = headcount.max_workers();
    if target > max {
        return Err(ControlError::TargetOutOfRange { target, max });
    }
    Ok(())
}

/// How long a maximizer waits between checks
///
/// # Example
/// ```
/// use firm_control_core_rs::{CheckInterval, RngManager};
///
/// let mut rng = RngManager::new(3);
/// let interval = CheckInterval::default();
/// for _ in 0..50 {
///     let days = interval.draw_days(&mut rng);
///     assert!((4..=10).contains(&days));
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckInterval {
    /// `base_days` plus a uniform integer in `[-jitter_days, +jitter_days]`,
    /// never below one day
    Jittered { base_days: u32, jitter_days: u32 },
    /// Each day fires with probability `1 / mean_days`
    Bernoulli { mean_days: u32 },
}

impl Default for CheckInterval {
    fn default() -> Self {
        CheckInterval::Jittered {
            base_days: 7,
            jitter_days: 3,
        }
    }
}

impl CheckInterval {
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            CheckInterval::Jittered { base_days, .. } if base_days == 0 => {
                Err("jittered check interval needs base_days >= 1".to_string())
            }
            CheckInterval::Bernoulli { mean_days } if mean_days == 0 => {
                Err("bernoulli check interval needs mean_days >= 1".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Nominal delay for the next check
    ///
    /// Jittered intervals consume one draw; Bernoulli intervals return their
    /// mean without drawing (the delay is drawn when scheduling).
    pub fn draw_days(&self, rng: &mut RngManager) -> usize {
        match *self {
            CheckInterval::Jittered {
                base_days,
                jitter_days,
            } => {
                let jitter = if jitter_days == 0 {
                    0
                } else {
                    rng.range_inclusive(-(jitter_days as i64), jitter_days as i64)
                };
                (base_days as i64 + jitter).max(1) as usize
            }
            CheckInterval::Bernoulli { mean_days } => mean_days.max(1) as usize,
        }
    }

    /// Schedule the calling task `days` days away at `phase`: exactly, or
    /// with daily probability `1 / days`
    pub fn reschedule(
        &self,
        agenda: &mut dyn Agenda,
        phase: Phase,
        days: usize,
    ) -> Result<(), ScheduleError> {
        let days = days.max(1);
        match self {
            CheckInterval::Jittered { .. } => {
                agenda.schedule_another_day(phase, days, Priority::Standard)
            }
            CheckInterval::Bernoulli { .. } => agenda
                .schedule_with_fixed_probability(phase, 1.0 / days as f64, Priority::Standard)
                .map(|_| ()),
        }
    }
}

impl fmt::Display for CheckInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckInterval::Jittered {
                base_days,
                jitter_days,
            } => write!(f, "{}±{} days", base_days, jitter_days),
            CheckInterval::Bernoulli { mean_days } => write!(f, "~{} days (bernoulli)", mean_days),
        }
    }
}

/// What a maximizer did on one of its steps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MaximizerOutcome {
    /// Turned off or never started: nothing done, nothing scheduled
    Idle,
    /// Headcount stuck at zero with a positive target: retry tomorrow
    Deferred,
    /// Headcount does not match the target yet
    WaitingForTarget { workers: u32, target: u32 },
    /// First match: the profit observation is scheduled `days` ahead
    ObservationScheduled { days: usize },
    /// The algorithm wants another observation cycle
    NeedMoreTime,
    /// A target was committed
    Retargeted { from: u32, to: u32, profits: f64 },
}

/// The slow loop: a self-scheduling policy that sets the worker target
pub trait WorkforceMaximizer: fmt::Debug + Send {
    /// Install the initial target and schedule the first step
    fn start(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<(), ControlError>;

    /// One scheduled step
    fn step(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        profits: &dyn ProfitOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<MaximizerOutcome, ControlError>;

    /// The plant's technology changed
    fn change_in_machinery(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<(), ControlError>;

    /// Stop for good; a second call is an error
    fn turn_off(&mut self) -> Result<(), ControlError>;

    fn is_active(&self) -> bool;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{AgendaRequest, RecordingAgenda};

    #[test]
    fn test_jitter_never_below_one_day() {
        let mut rng = RngManager::new(17);
        let interval = CheckInterval::Jittered {
            base_days: 1,
            jitter_days: 3,
        };
        for _ in 0..200 {
            assert!(interval.draw_days(&mut rng) >= 1);
        }
    }

    #[test]
    fn test_zero_jitter_is_exact() {
        let mut rng = RngManager::new(17);
        let interval = CheckInterval::Jittered {
            base_days: 7,
            jitter_days: 0,
        };
        assert_eq!(interval.draw_days(&mut rng), 7);
    }

    #[test]
    fn test_bernoulli_reschedule_uses_inverse_days() {
        let mut agenda = RecordingAgenda::new(5);
        let interval = CheckInterval::Bernoulli { mean_days: 20 };
        let days = interval.draw_days(agenda.rng());
        interval.reschedule(&mut agenda, Phase::Think, days).unwrap();
        match agenda.last_request() {
            Some(AgendaRequest::FixedProbability { probability, .. }) => {
                assert!((probability - 0.05).abs() < 1e-12)
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(CheckInterval::Bernoulli { mean_days: 0 }.validate().is_err());
        assert!(CheckInterval::default().validate().is_ok());
    }
}
