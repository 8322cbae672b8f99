//! Inventory-level rating
//!
//! Acquisition departments (purchases, hiring) ask one question on every
//! inventory change: should I keep buying? [`InventoryControl`] answers it by
//! rating the current stock against a target computed by an
//! [`InventoryTargetPolicy`].

pub mod policies;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

pub use policies::{ConsumerNeed, InventoryTarget, InventoryTargetPolicy};

/// Errors raised by inventory control
#[derive(Debug, Error, PartialEq)]
pub enum InventoryError {
    #[error("Fixed inventory multiplier must be at least 1, got {0}")]
    MultiplierBelowOne(f64),

    #[error("Days of buffer must be finite and non-negative, got {0}")]
    InvalidBuffer(f64),

    #[error("Consumer need must be finite and non-negative, got {0} runs per week")]
    InvalidConsumer(f64),

    #[error("Inventory control already turned off")]
    AlreadyTurnedOff,
}

/// Rating of the current stock, from most to least urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryLevel {
    Danger,
    Barely,
    Acceptable,
    TooMuch,
}

impl InventoryLevel {
    /// Acquisition continues up to and including `Acceptable`
    pub fn wants_more(&self) -> bool {
        *self <= InventoryLevel::Acceptable
    }
}

impl fmt::Display for InventoryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InventoryLevel::Danger => "danger",
            InventoryLevel::Barely => "barely",
            InventoryLevel::Acceptable => "acceptable",
            InventoryLevel::TooMuch => "too_much",
        };
        f.write_str(name)
    }
}

/// Rates one good's stock and decides whether to keep acquiring it
///
/// # Example
/// ```
/// use firm_control_core_rs::inventory::{ConsumerNeed, InventoryControl, InventoryLevel, InventoryTargetPolicy};
///
/// let mut control = InventoryControl::new(InventoryTargetPolicy::daily_need(2.0).unwrap());
/// control.update_consumers(vec![ConsumerNeed::new(3, 7.0)]).unwrap();
///
/// assert!(control.inventory_changed(4));
/// assert_eq!(control.rate_current_level(), Some(InventoryLevel::Barely));
/// assert!(!control.inventory_changed(9));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryControl {
    policy: InventoryTargetPolicy,
    consumers: Vec<ConsumerNeed>,
    target: InventoryTarget,
    stock: u64,
    active: bool,
}

impl InventoryControl {
    pub fn new(policy: InventoryTargetPolicy) -> Self {
        let target = policy.compute_target(&[]);
        Self {
            policy,
            consumers: Vec::new(),
            target,
            stock: 0,
            active: true,
        }
    }

    /// Replace the consumer set and recompute the target
    ///
    /// Either every consumer is valid and the target is replaced, or
    /// nothing changes.
    pub fn update_consumers(&mut self, consumers: Vec<ConsumerNeed>) -> Result<(), InventoryError> {
        if let Some(bad) = consumers
            .iter()
            .find(|c| !c.weekly_runs.is_finite() || c.weekly_runs < 0.0)
        {
            return Err(InventoryError::InvalidConsumer(bad.weekly_runs));
        }
        self.target = self.policy.compute_target(&consumers);
        self.consumers = consumers;
        debug!(stock_target = self.target.target, "inventory target recomputed");
        Ok(())
    }

    /// Record a new stock level; returns whether acquisition should go on
    pub fn inventory_changed(&mut self, stock: u64) -> bool {
        self.stock = stock;
        self.can_acquire()
    }

    /// `None` once turned off
    pub fn rate_current_level(&self) -> Option<InventoryLevel> {
        if !self.active {
            return None;
        }
        Some(self.target.rate(self.stock))
    }

    pub fn can_acquire(&self) -> bool {
        self.rate_current_level()
            .is_some_and(|level| level.wants_more())
    }

    /// Units missing (negative) or in excess (positive) of an acceptable
    /// stock
    pub fn estimate_demand_gap(&self) -> i64 {
        self.policy.demand_gap(self.stock, &self.target)
    }

    pub fn target(&self) -> &InventoryTarget {
        &self.target
    }

    pub fn policy(&self) -> &InventoryTargetPolicy {
        &self.policy
    }

    pub fn consumers(&self) -> &[ConsumerNeed] {
        &self.consumers
    }

    pub fn stock(&self) -> u64 {
        self.stock
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn turn_off(&mut self) -> Result<(), InventoryError> {
        if !self.active {
            return Err(InventoryError::AlreadyTurnedOff);
        }
        self.active = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(InventoryLevel::Danger < InventoryLevel::Barely);
        assert!(InventoryLevel::Barely < InventoryLevel::Acceptable);
        assert!(InventoryLevel::Acceptable < InventoryLevel::TooMuch);
        assert!(InventoryLevel::Acceptable.wants_more());
        assert!(!InventoryLevel::TooMuch.wants_more());
    }

    #[test]
    fn test_invalid_consumer_leaves_target_untouched() {
        let mut control = InventoryControl::new(InventoryTargetPolicy::Simple);
        control.update_consumers(vec![ConsumerNeed::new(4, 1.0)]).unwrap();
        let before = *control.target();
        let err = control
            .update_consumers(vec![ConsumerNeed::new(1, 1.0), ConsumerNeed::new(1, f64::NAN)])
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidConsumer(_)));
        assert_eq!(*control.target(), before);
        assert_eq!(control.consumers().len(), 1);
    }

    #[test]
    fn test_turned_off_control_stops_acquiring() {
        let mut control = InventoryControl::new(InventoryTargetPolicy::fixed(10, 1.0).unwrap());
        assert!(control.inventory_changed(0));
        control.turn_off().unwrap();
        assert_eq!(control.rate_current_level(), None);
        assert!(!control.inventory_changed(0));
        assert_eq!(control.turn_off(), Err(InventoryError::AlreadyTurnedOff));
    }
}
