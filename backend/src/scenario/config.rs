//! Scenario configuration
//!
//! Every field has a default, so a JSON config only needs the values it
//! changes. `validate()` runs before any scenario is built.

use crate::controller::PidGains;
use crate::workforce::maximizer::DEFAULT_WEEKS_TO_MAKE_OBSERVATION;
use crate::workforce::periodic::DEFAULT_AVERAGE_CHECK_FREQUENCY;
use crate::workforce::CheckInterval;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Unknown maximization algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("No drawable maximization algorithm registered")]
    NothingDrawable,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn check_gains(field: &'static str, gains: &PidGains) -> Result<(), ConfigError> {
    let all_finite = gains.proportional.is_finite()
        && gains.integral.is_finite()
        && gains.derivative.is_finite();
    if !all_finite {
        return Err(invalid(field, "gains must be finite"));
    }
    Ok(())
}

fn default_weeks() -> u32 {
    DEFAULT_WEEKS_TO_MAKE_OBSERVATION
}

fn default_periodic_interval() -> CheckInterval {
    CheckInterval::Bernoulli {
        mean_days: DEFAULT_AVERAGE_CHECK_FREQUENCY,
    }
}

/// Which slow loop sets the worker target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaximizerKind {
    SetTargetThenRetry {
        #[serde(default = "default_weeks")]
        weeks_to_make_observation: u32,
        #[serde(default)]
        interval: CheckInterval,
    },
    Periodic {
        #[serde(default = "default_periodic_interval")]
        interval: CheckInterval,
    },
    FullCapacity,
}

impl Default for MaximizerKind {
    fn default() -> Self {
        MaximizerKind::SetTargetThenRetry {
            weeks_to_make_observation: DEFAULT_WEEKS_TO_MAKE_OBSERVATION,
            interval: CheckInterval::default(),
        }
    }
}

impl MaximizerKind {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            MaximizerKind::SetTargetThenRetry { interval, .. }
            | MaximizerKind::Periodic { interval } => {
                interval.validate().map_err(|reason| invalid("interval", reason))
            }
            MaximizerKind::FullCapacity => Ok(()),
        }
    }
}

/// New technology installed on a given day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineryChange {
    pub day: usize,
    pub productivity: f64,
    pub max_workers: u32,
}

/// One plant selling to a linear demand and hiring from a linear labor
/// supply
///
/// Price is `demand_intercept − demand_slope·q`; the k-th worker asks for
/// `wage_intercept + wage_slope·k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonopolistConfig {
    pub seed: u64,
    pub days: usize,
    pub demand_intercept: f64,
    pub demand_slope: f64,
    pub wage_intercept: i64,
    pub wage_slope: i64,
    /// Units per worker per day
    pub productivity: f64,
    pub max_workers: u32,
    pub weekly_fixed_costs: f64,
    /// Days of accounts summed by the profit oracle
    pub profit_window_days: usize,
    pub targeter_gains: PidGains,
    pub targeter_speed: u32,
    pub initial_wage: i64,
    pub maximizer: MaximizerKind,
    /// Registry name; drawn at random among drawable entries when absent
    pub algorithm: Option<String>,
    /// Used by the `fixed_target` algorithm
    pub fixed_target: u32,
    pub machinery_change: Option<MachineryChange>,
    /// Turn workforce control off at the end of this day
    pub shutdown_day: Option<usize>,
}

impl Default for MonopolistConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            days: 5000,
            demand_intercept: 118.0,
            demand_slope: 3.0,
            wage_intercept: 11,
            wage_slope: 2,
            productivity: 3.0,
            max_workers: 100,
            weekly_fixed_costs: 0.0,
            profit_window_days: 7,
            targeter_gains: PidGains::new(0.5, 0.1, 0.0),
            targeter_speed: 0,
            initial_wage: 0,
            maximizer: MaximizerKind::default(),
            algorithm: Some("hill_climber".to_string()),
            fixed_target: 1,
            machinery_change: None,
            shutdown_day: None,
        }
    }
}

impl MonopolistConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(invalid("days", "must run at least one day"));
        }
        if !self.demand_intercept.is_finite() || !self.demand_slope.is_finite() {
            return Err(invalid("demand", "intercept and slope must be finite"));
        }
        if self.demand_slope < 0.0 {
            return Err(invalid("demand_slope", "demand must not slope upwards"));
        }
        if self.wage_intercept < 0 {
            return Err(invalid("wage_intercept", "must be non-negative"));
        }
        if self.wage_slope < 1 {
            return Err(invalid("wage_slope", "must be at least 1"));
        }
        if !(self.productivity > 0.0 && self.productivity.is_finite()) {
            return Err(invalid("productivity", "must be positive"));
        }
        if self.max_workers == 0 {
            return Err(invalid("max_workers", "must be at least 1"));
        }
        if !(self.weekly_fixed_costs >= 0.0 && self.weekly_fixed_costs.is_finite()) {
            return Err(invalid("weekly_fixed_costs", "must be finite and non-negative"));
        }
        if self.profit_window_days == 0 {
            return Err(invalid("profit_window_days", "must be at least 1"));
        }
        if self.initial_wage < 0 {
            return Err(invalid("initial_wage", "must be non-negative"));
        }
        if self.fixed_target > self.max_workers {
            return Err(invalid(
                "fixed_target",
                format!("{} exceeds max_workers {}", self.fixed_target, self.max_workers),
            ));
        }
        check_gains("targeter_gains", &self.targeter_gains)?;
        self.maximizer.validate()?;
        if let Some(change) = &self.machinery_change {
            if !(change.productivity > 0.0 && change.productivity.is_finite()) {
                return Err(invalid("machinery_change", "productivity must be positive"));
            }
            if change.max_workers == 0 {
                return Err(invalid("machinery_change", "max_workers must be at least 1"));
            }
        }
        Ok(())
    }

    /// Workers that maximize daily profit under this config
    pub fn optimal_workers(&self) -> u32 {
        crate::scenario::find_worker_target_that_maximizes_profits(
            self.demand_intercept,
            self.demand_slope,
            self.wage_intercept as f64,
            self.wage_slope as f64,
            self.productivity,
        )
    }

    /// Lowest wage that attracts `workers`
    pub fn wage_for(&self, workers: u32) -> i64 {
        self.wage_intercept + self.wage_slope * workers as i64
    }
}

/// Options for tuning the buyer cascade's speed online
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StickinessTuning {
    pub window: usize,
    pub step: u32,
    pub max_speed: u32,
}

/// A purchasing department keeping a stock of input for a constant daily
/// consumption
///
/// Daily inflow at price `p` is `(p − supply_intercept) / supply_slope`
/// units, nothing below `supply_intercept + supply_slope`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuyerConfig {
    pub seed: u64,
    pub days: usize,
    pub supply_intercept: i64,
    pub supply_slope: i64,
    pub daily_demand: u64,
    pub days_of_buffer: f64,
    pub master_gains: PidGains,
    pub slave_gains: PidGains,
    pub initial_price: i64,
    pub stickiness_tuning: Option<StickinessTuning>,
}

impl Default for BuyerConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            days: 3000,
            supply_intercept: 10,
            supply_slope: 1,
            daily_demand: 4,
            days_of_buffer: 2.0,
            master_gains: PidGains::new(0.1, 0.02, 0.0),
            slave_gains: PidGains::new(0.5, 0.1, 0.0),
            initial_price: 0,
            stickiness_tuning: None,
        }
    }
}

impl BuyerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(invalid("days", "must run at least one day"));
        }
        if self.supply_intercept < 0 {
            return Err(invalid("supply_intercept", "must be non-negative"));
        }
        if self.supply_slope < 1 {
            return Err(invalid("supply_slope", "must be at least 1"));
        }
        if self.daily_demand == 0 {
            return Err(invalid("daily_demand", "must be at least 1"));
        }
        if !(self.days_of_buffer >= 0.0 && self.days_of_buffer.is_finite()) {
            return Err(invalid("days_of_buffer", "must be finite and non-negative"));
        }
        if self.initial_price < 0 {
            return Err(invalid("initial_price", "must be non-negative"));
        }
        check_gains("master_gains", &self.master_gains)?;
        check_gains("slave_gains", &self.slave_gains)?;
        if let Some(tuning) = &self.stickiness_tuning {
            if tuning.window == 0 || tuning.step == 0 {
                return Err(invalid(
                    "stickiness_tuning",
                    "window and step must be positive",
                ));
            }
        }
        Ok(())
    }

    /// Daily-need stock target for this config
    pub fn stock_target(&self) -> f64 {
        self.days_of_buffer * self.daily_demand as f64
    }
}
