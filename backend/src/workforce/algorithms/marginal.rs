//! Marginal maximizer
//!
//! Estimates marginal revenue and marginal cost per worker as the slopes of
//! two linear trends (revenues over target, costs over target) and moves one
//! worker toward the side with the larger marginal profit. Staying put wins
//! only when both moves lose money.
//!
//! A staffed plant that has not sold anything yet gives no price to value
//! its output at. The maximizer then asks for more time, up to `patience`
//! cycles in a row, after which zero revenue is taken at face value.

use crate::controller::finite_or_zero;
use crate::stats::LinearTrend;
use crate::workforce::algorithms::{MaximizationAlgorithm, TargetDecision, TargetObservation};
use crate::workforce::HeadcountOracle;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Observations kept for the marginal estimates
pub const DEFAULT_MARGINAL_WINDOW: usize = 4;

/// Consecutive cycles without sales before deciding anyway
pub const DEFAULT_PATIENCE: u32 = 3;

/// One-worker steps driven by estimated marginal profits
///
/// # Example
/// ```
/// use firm_control_core_rs::workforce::{
///     MarginalMaximizer, MaximizationAlgorithm, TargetDecision, TargetObservation,
/// };
///
/// let mut maximizer = MarginalMaximizer::new(0, 10);
/// let mut observation = TargetObservation {
///     current_target: 1,
///     new_profits: 0.0,
///     new_revenues: 0.0,
///     new_costs: 13.0,
///     old_revenues: 0.0,
///     old_costs: 0.0,
///     old_target: 0,
///     old_profits: 0.0,
/// };
/// // nothing sold yet
/// assert_eq!(maximizer.choose_worker_target(&observation), TargetDecision::NeedMoreTime);
///
/// // one worker brings in 100 and costs 13: hire another
/// observation.new_revenues = 100.0;
/// assert_eq!(maximizer.choose_worker_target(&observation), TargetDecision::Retarget(2));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginalMaximizer {
    revenues: LinearTrend,
    costs: LinearTrend,
    min_workers: u32,
    max_workers: u32,
    patience: u32,
    delays: u32,
}

impl MarginalMaximizer {
    pub fn new(min_workers: u32, max_workers: u32) -> Self {
        Self {
            revenues: LinearTrend::new(DEFAULT_MARGINAL_WINDOW),
            costs: LinearTrend::new(DEFAULT_MARGINAL_WINDOW),
            min_workers,
            max_workers,
            patience: DEFAULT_PATIENCE,
            delays: 0,
        }
    }

    pub fn with_patience(mut self, patience: u32) -> Self {
        self.patience = patience;
        self
    }

    /// Estimated change in profits per extra worker, `None` until two
    /// different targets have been observed
    pub fn marginal_profits(&self) -> Option<f64> {
        let revenue = self.revenues.try_fit()?;
        let cost = self.costs.try_fit()?;
        Some(finite_or_zero(revenue.slope) - finite_or_zero(cost.slope))
    }

    fn waiting_for_sales(&self, observation: &TargetObservation) -> bool {
        observation.current_target > 0
            && (observation.new_revenues.is_nan() || observation.new_revenues <= 0.0)
            && self.delays < self.patience
    }

    fn record(&mut self, target: u32, revenues: f64, costs: f64) {
        self.revenues.push(target as f64, revenues);
        self.costs.push(target as f64, costs);
    }

    fn clear(&mut self) {
        self.revenues.clear();
        self.costs.clear();
        self.delays = 0;
    }
}

impl MaximizationAlgorithm for MarginalMaximizer {
    fn choose_worker_target(&mut self, observation: &TargetObservation) -> TargetDecision {
        if self.waiting_for_sales(observation) {
            self.delays += 1;
            debug!(
                worker_target = observation.current_target,
                delays = self.delays,
                "no sales to price output at"
            );
            return TargetDecision::NeedMoreTime;
        }
        self.delays = 0;

        let current = observation.current_target;
        if self.revenues.is_empty() && observation.old_target != current {
            self.record(
                observation.old_target,
                observation.old_revenues,
                observation.old_costs,
            );
        }
        self.record(current, observation.new_revenues, observation.new_costs);

        // a single observed target says nothing about slopes: try one more worker
        let marginal = self.marginal_profits().unwrap_or(0.0);

        let if_increase = if current < self.max_workers {
            marginal
        } else {
            f64::NEG_INFINITY
        };
        let if_decrease = if current > self.min_workers {
            -marginal
        } else {
            f64::NEG_INFINITY
        };

        if if_increase < 0.0 && if_decrease < 0.0 {
            TargetDecision::Retarget(current)
        } else if if_increase >= if_decrease {
            TargetDecision::Retarget(current + 1)
        } else {
            TargetDecision::Retarget(current - 1)
        }
    }

    fn reset(&mut self, headcount: &dyn HeadcountOracle) {
        self.clear();
        self.min_workers = headcount.min_workers();
        self.max_workers = headcount.max_workers();
    }

    fn turn_off(&mut self) {
        self.clear();
    }

    fn name(&self) -> &'static str {
        "marginal"
    }
}
