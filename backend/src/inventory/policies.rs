//! Inventory target policies
//!
//! A policy turns the set of consumers of a good into an [`InventoryTarget`]
//! (a quantity plus three rating thresholds) and knows how far the current
//! stock is from an acceptable level.

use crate::inventory::{InventoryError, InventoryLevel};
use serde::{Deserialize, Serialize};

/// What one consumer of the good needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumerNeed {
    /// Units consumed by one production run
    pub per_run: u64,
    /// Expected production runs per week
    pub weekly_runs: f64,
}

impl ConsumerNeed {
    pub fn new(per_run: u64, weekly_runs: f64) -> Self {
        Self {
            per_run,
            weekly_runs,
        }
    }

    /// Units needed per week
    pub fn weekly_need(&self) -> f64 {
        self.per_run as f64 * self.weekly_runs
    }
}

/// Target stock and the thresholds separating the four levels
///
/// Stock strictly below `danger` is [`InventoryLevel::Danger`], below
/// `barely` is `Barely`, below `too_much` is `Acceptable`, everything else
/// is `TooMuch`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InventoryTarget {
    pub target: f64,
    pub danger: f64,
    pub barely: f64,
    pub too_much: f64,
}

impl InventoryTarget {
    /// A target of zero: every stock is too much
    pub fn zero() -> Self {
        Self {
            target: 0.0,
            danger: 0.0,
            barely: 0.0,
            too_much: 0.0,
        }
    }

    pub fn rate(&self, stock: u64) -> InventoryLevel {
        let stock = stock as f64;
        if stock < self.danger {
            InventoryLevel::Danger
        } else if stock < self.barely {
            InventoryLevel::Barely
        } else if stock < self.too_much {
            InventoryLevel::Acceptable
        } else {
            InventoryLevel::TooMuch
        }
    }
}

/// How the target is derived from the consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryTargetPolicy {
    /// Constant target regardless of consumers
    Fixed { target: u64, multiplier: f64 },
    /// Multiples of one run of every consumer
    Simple,
    /// A number of days of expected consumption
    DailyNeed { days_of_buffer: f64 },
}

impl InventoryTargetPolicy {
    /// # Errors
    /// `InventoryError::MultiplierBelowOne` if `multiplier < 1`
    pub fn fixed(target: u64, multiplier: f64) -> Result<Self, InventoryError> {
        let policy = InventoryTargetPolicy::Fixed { target, multiplier };
        policy.validate()?;
        Ok(policy)
    }

    /// # Errors
    /// `InventoryError::InvalidBuffer` unless `days_of_buffer` is finite and
    /// non-negative
    pub fn daily_need(days_of_buffer: f64) -> Result<Self, InventoryError> {
        let policy = InventoryTargetPolicy::DailyNeed { days_of_buffer };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), InventoryError> {
        match *self {
            InventoryTargetPolicy::Fixed { multiplier, .. } => {
                if !(multiplier >= 1.0) {
                    return Err(InventoryError::MultiplierBelowOne(multiplier));
                }
            }
            InventoryTargetPolicy::Simple => {}
            InventoryTargetPolicy::DailyNeed { days_of_buffer } => {
                if !days_of_buffer.is_finite() || days_of_buffer < 0.0 {
                    return Err(InventoryError::InvalidBuffer(days_of_buffer));
                }
            }
        }
        Ok(())
    }

    /// Recompute the target from scratch for the given consumers
    ///
    /// # Example
    /// ```
    /// use firm_control_core_rs::inventory::{ConsumerNeed, InventoryTargetPolicy};
    ///
    /// let policy = InventoryTargetPolicy::daily_need(2.0).unwrap();
    /// // 3 units per run, 7 runs a week: 3 a day, two days of buffer
    /// let target = policy.compute_target(&[ConsumerNeed::new(3, 7.0)]);
    /// assert_eq!(target.target, 6.0);
    /// assert_eq!(target.danger, 3.0);
    /// assert_eq!(target.too_much, 9.0);
    /// ```
    pub fn compute_target(&self, consumers: &[ConsumerNeed]) -> InventoryTarget {
        match *self {
            InventoryTargetPolicy::Fixed { target, multiplier } => {
                let target = target as f64;
                InventoryTarget {
                    target,
                    danger: 0.5 * target,
                    barely: target,
                    too_much: multiplier * target,
                }
            }
            InventoryTargetPolicy::Simple => {
                let need: u64 = consumers.iter().map(|c| c.per_run).sum();
                let need = need as f64;
                InventoryTarget {
                    target: 2.0 * need,
                    danger: need,
                    barely: 2.0 * need,
                    too_much: 3.0 * need,
                }
            }
            InventoryTargetPolicy::DailyNeed { days_of_buffer } => {
                let weekly: f64 = consumers.iter().map(ConsumerNeed::weekly_need).sum();
                let target = days_of_buffer * weekly / 7.0;
                if target <= 0.0 {
                    return InventoryTarget::zero();
                }
                let single_run: u64 = consumers
                    .iter()
                    .filter(|c| c.weekly_need() > 0.0)
                    .map(|c| c.per_run)
                    .sum();
                InventoryTarget {
                    target,
                    danger: (single_run as f64).min(target + 1.0).floor(),
                    barely: target,
                    too_much: 1.5 * target,
                }
            }
        }
    }

    /// Signed distance from an acceptable stock: negative means missing
    /// units, positive means excess, zero means acceptable
    pub fn demand_gap(&self, stock: u64, target: &InventoryTarget) -> i64 {
        if target.rate(stock) == InventoryLevel::Acceptable {
            return 0;
        }
        let stock_f = stock as f64;
        match *self {
            InventoryTargetPolicy::Fixed { multiplier, .. } => {
                if stock_f < target.target {
                    stock_f as i64 - target.target as i64
                } else {
                    stock_f as i64 - (multiplier * target.target).round() as i64
                }
            }
            InventoryTargetPolicy::Simple => {
                // thresholds are whole multiples of the per-run need
                if stock_f < target.too_much {
                    stock as i64 - target.barely as i64
                } else {
                    stock as i64 - target.too_much as i64
                }
            }
            InventoryTargetPolicy::DailyNeed { .. } => {
                if stock_f < 3.0 * target.target {
                    (stock_f - target.target).round() as i64
                } else {
                    (stock_f - 1.5 * target.target).round() as i64
                }
            }
        }
    }
}
