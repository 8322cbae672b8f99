//! Buyer reference world
//!
//! A purchasing department keeps a stock of input for a plant that consumes
//! a fixed amount every day. It posts an offer price; a linear supply
//! answers with a daily inflow. A cascade controller sets the price: the
//! master turns the stock gap into a flow target, the slave turns the flow
//! gap into a price. The stock target comes from the daily-need inventory
//! policy, and buying pauses while the stock is rated too high.
//!
//! Daily order of business: `Trade` (buy at the posted price), `Production`
//! (consume), `AdjustPrices` (cascade step).

use crate::controller::{CascadeController, Controller, StickinessTuner};
use crate::core::time::{Phase, Priority};
use crate::inventory::{ConsumerNeed, InventoryControl, InventoryLevel, InventoryTargetPolicy};
use crate::models::{ControlEvent, EventLog};
use crate::scenario::checkpoint::{compute_config_hash, trajectory_digest};
use crate::scenario::config::BuyerConfig;
use crate::scenario::ScenarioError;
use crate::scheduler::PhaseScheduler;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Days averaged at the end of a run for the summary
pub const BUYER_SUMMARY_TAIL_DAYS: usize = 300;

const OWNER: &str = "purchases";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuyerTask {
    Trade,
    Production,
    AdjustPrices,
}

/// One trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyerDay {
    pub day: usize,
    pub price: i64,
    pub inflow: u64,
    pub consumed: u64,
    pub stock: u64,
    pub flow_target: f64,
    pub level: Option<InventoryLevel>,
}

/// End-of-run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerSummary {
    pub days: usize,
    pub final_price: i64,
    pub final_stock: u64,
    pub stock_target: f64,
    pub final_level: Option<InventoryLevel>,
    pub tail_average_inflow: f64,
    pub tail_average_stock: f64,
    pub demand_gap: i64,
    pub controller_speed: u32,
    pub events: usize,
    pub config_hash: String,
    pub trajectory_digest: String,
}

/// Linear supply: nothing below `intercept + slope`, then one more unit per
/// `slope` of price
#[derive(Debug, Clone, Copy)]
struct LinearSupply {
    intercept: i64,
    slope: i64,
}

impl LinearSupply {
    fn inflow(&self, price: i64) -> u64 {
        if price < self.intercept + self.slope {
            return 0;
        }
        ((price - self.intercept) / self.slope) as u64
    }
}

#[derive(Debug)]
struct Department {
    supply: LinearSupply,
    daily_demand: u64,
    stock: u64,
    price: i64,
    inflow: u64,
    consumed: u64,
    inventory: InventoryControl,
    cascade: CascadeController,
    tuner: Option<StickinessTuner>,
    last_level: Option<InventoryLevel>,
    log: EventLog,
    trajectory: Vec<BuyerDay>,
}

impl Department {
    fn handle(
        &mut self,
        scheduler: &mut PhaseScheduler<BuyerTask>,
        task: BuyerTask,
    ) -> Result<(), ScenarioError> {
        let day = scheduler.current_day();
        match task {
            BuyerTask::Trade => {
                self.inflow = if self.inventory.can_acquire() {
                    self.supply.inflow(self.price)
                } else {
                    0
                };
                self.stock += self.inflow;
                self.inventory_changed(day);
                scheduler.schedule_tomorrow(Phase::Trade, task, Priority::Standard);
            }
            BuyerTask::Production => {
                self.consumed = self.stock.min(self.daily_demand);
                self.stock -= self.consumed;
                self.inventory_changed(day);
                scheduler.schedule_tomorrow(Phase::Production, task, Priority::Standard);
            }
            BuyerTask::AdjustPrices => {
                self.adjust_price(day);
                scheduler.schedule_tomorrow(Phase::AdjustPrices, task, Priority::Standard);
            }
        }
        Ok(())
    }

    /// Rate the new stock; level changes go to the log
    fn inventory_changed(&mut self, day: usize) {
        self.inventory.inventory_changed(self.stock);
        let level = self.inventory.rate_current_level();
        if level != self.last_level {
            if let Some(level) = level {
                self.log.log(ControlEvent::InventoryRated {
                    day,
                    owner: OWNER.to_string(),
                    stock: self.stock,
                    stock_target: self.inventory.target().target,
                    level,
                });
            }
            self.last_level = level;
        }
    }

    fn adjust_price(&mut self, day: usize) {
        let stock_target = self.inventory.target().target;
        self.cascade.adjust(
            stock_target,
            self.stock as f64,
            self.inflow as f64,
            self.inventory.is_active(),
        );
        if let Some(tuner) = self.tuner.as_mut() {
            tuner.observe(&mut self.cascade, stock_target, self.stock as f64);
        }

        let new_price = self.cascade.current_mv().round() as i64;
        if new_price != self.price {
            debug!(day, old_price = self.price, new_price, "offer price changed");
            self.log.log(ControlEvent::PriceChanged {
                day,
                owner: OWNER.to_string(),
                old_price: self.price,
                new_price,
            });
            self.price = new_price;
        }

        self.trajectory.push(BuyerDay {
            day,
            price: self.price,
            inflow: self.inflow,
            consumed: self.consumed,
            stock: self.stock,
            flow_target: self.cascade.flow_target(),
            level: self.last_level,
        });
    }
}

/// A runnable buyer world
///
/// # Example
/// ```
/// use firm_control_core_rs::scenario::{BuyerConfig, BuyerScenario};
///
/// let mut scenario = BuyerScenario::new(BuyerConfig { days: 100, ..Default::default() }).unwrap();
/// let summary = scenario.run().unwrap();
/// assert_eq!(summary.days, 100);
/// assert_eq!(summary.stock_target, 8.0);
/// ```
#[derive(Debug)]
pub struct BuyerScenario {
    config: BuyerConfig,
    config_hash: String,
    scheduler: PhaseScheduler<BuyerTask>,
    department: Department,
    started: bool,
}

impl BuyerScenario {
    pub fn new(config: BuyerConfig) -> Result<Self, ScenarioError> {
        config.validate()?;
        let config_hash = compute_config_hash(&config)?;

        let mut inventory =
            InventoryControl::new(InventoryTargetPolicy::daily_need(config.days_of_buffer)?);
        inventory.update_consumers(vec![ConsumerNeed::new(config.daily_demand, 7.0)])?;

        let mut cascade = CascadeController::new(config.master_gains, config.slave_gains);
        cascade.set_offset(config.initial_price as f64);

        let tuner = config
            .stickiness_tuning
            .map(|t| StickinessTuner::new(t.window, t.step, t.max_speed));

        let department = Department {
            supply: LinearSupply {
                intercept: config.supply_intercept,
                slope: config.supply_slope,
            },
            daily_demand: config.daily_demand,
            stock: 0,
            price: config.initial_price,
            inflow: 0,
            consumed: 0,
            inventory,
            cascade,
            tuner,
            last_level: None,
            log: EventLog::new(),
            trajectory: Vec::with_capacity(config.days),
        };

        Ok(Self {
            scheduler: PhaseScheduler::new(config.seed),
            config,
            config_hash,
            department,
            started: false,
        })
    }

    fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.scheduler
            .schedule_soon(Phase::Trade, BuyerTask::Trade, Priority::Standard);
        self.scheduler
            .schedule_soon(Phase::Production, BuyerTask::Production, Priority::Standard);
        self.scheduler.schedule_soon(
            Phase::AdjustPrices,
            BuyerTask::AdjustPrices,
            Priority::Standard,
        );
    }

    /// Run every event up to and including `last_day`
    pub fn run_until(&mut self, last_day: usize) -> Result<usize, ScenarioError> {
        self.start();
        let department = &mut self.department;
        self.scheduler
            .try_run_until(last_day, |scheduler, event| department.handle(scheduler, event.task))
    }

    pub fn run(&mut self) -> Result<BuyerSummary, ScenarioError> {
        self.run_until(self.config.days - 1)?;
        self.summary()
    }

    pub fn summary(&self) -> Result<BuyerSummary, ScenarioError> {
        let department = &self.department;
        let trajectory = &department.trajectory;
        let tail = &trajectory[trajectory.len().saturating_sub(BUYER_SUMMARY_TAIL_DAYS)..];
        let tail_len = tail.len().max(1) as f64;

        Ok(BuyerSummary {
            days: trajectory.len(),
            final_price: department.price,
            final_stock: department.stock,
            stock_target: department.inventory.target().target,
            final_level: department.inventory.rate_current_level(),
            tail_average_inflow: tail.iter().map(|d| d.inflow as f64).sum::<f64>() / tail_len,
            tail_average_stock: tail.iter().map(|d| d.stock as f64).sum::<f64>() / tail_len,
            demand_gap: department.inventory.estimate_demand_gap(),
            controller_speed: department.cascade.master().speed(),
            events: department.log.len(),
            config_hash: self.config_hash.clone(),
            trajectory_digest: trajectory_digest(trajectory)?,
        })
    }

    /// Stop buying for good: the cascade freezes and the stock runs down
    pub fn turn_off(&mut self) -> Result<(), ScenarioError> {
        self.department.inventory.turn_off()?;
        let day = self.scheduler.current_day();
        self.department.log.log(ControlEvent::TurnedOff {
            day,
            owner: OWNER.to_string(),
        });
        Ok(())
    }

    pub fn config(&self) -> &BuyerConfig {
        &self.config
    }

    pub fn trajectory(&self) -> &[BuyerDay] {
        &self.department.trajectory
    }

    pub fn event_log(&self) -> &EventLog {
        &self.department.log
    }

    pub fn inventory(&self) -> &InventoryControl {
        &self.department.inventory
    }

    pub fn cascade(&self) -> &CascadeController {
        &self.department.cascade
    }

    pub fn price(&self) -> i64 {
        self.department.price
    }

    pub fn stock(&self) -> u64 {
        self.department.stock
    }
}
