//! Monopolist reference world
//!
//! One plant sells its whole output into a linear demand curve and hires
//! from a linear labor supply. Workforce control (targeter plus maximizer)
//! is the only decision maker, so the run converges to the textbook
//! monopolist optimum when the control loops work.
//!
//! Daily order of business:
//!
//! | Phase          | Task           | Effect                                  |
//! |----------------|----------------|-----------------------------------------|
//! | `Dawn`         | machinery      | optional technology change              |
//! | `Dawn`         | labor market   | headcount follows the posted wage       |
//! | `Think`        | maximizer      | slow loop, self-scheduled               |
//! | `Production`   | production     | sell `productivity·workers` units       |
//! | `AdjustPrices` | targeter       | PID moves the wage toward the target    |
//! | `Final`        | shutdown       | optional, turns workforce control off   |

use crate::core::time::{Phase, Priority};
use crate::models::{ControlEvent, EventLog};
use crate::scenario::checkpoint::{compute_config_hash, trajectory_digest};
use crate::scenario::config::{ConfigError, MachineryChange, MaximizerKind, MonopolistConfig};
use crate::scenario::ScenarioError;
use crate::scheduler::PhaseScheduler;
use crate::workforce::{
    AlgorithmContext, AlgorithmRegistry, FullCapacityMaximizer, HeadcountOracle,
    MaximizationAlgorithm, MaximizerOutcome, PeriodicMaximizer, PidTargeter, PlantControl,
    ProfitOracle, SetTargetThenRetryMaximizer, WageSetter, WorkforceControl, WorkforceMaximizer,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Days averaged at the end of a run for the summary
pub const SUMMARY_TAIL_DAYS: usize = 200;

const OWNER: &str = "plant";

/// Workers count that maximizes daily profit
///
/// Tries every workforce from 1 to 199 and keeps the first strict
/// improvement over zero profit; returns 0 when no workforce is profitable.
///
/// # Example
/// ```
/// use firm_control_core_rs::scenario::find_worker_target_that_maximizes_profits;
///
/// assert_eq!(find_worker_target_that_maximizes_profits(118.0, 3.0, 11.0, 2.0, 3.0), 6);
/// assert_eq!(find_worker_target_that_maximizes_profits(5.0, 3.0, 11.0, 2.0, 3.0), 0);
/// ```
pub fn find_worker_target_that_maximizes_profits(
    demand_intercept: f64,
    demand_slope: f64,
    wage_intercept: f64,
    wage_slope: f64,
    productivity: f64,
) -> u32 {
    let mut best_profits = 0.0;
    let mut best_workers = 0;
    for workers in 1..200u32 {
        let output = workers as f64 * productivity;
        let price = demand_intercept - demand_slope * output;
        let wage = wage_intercept + wage_slope * workers as f64;
        let profits = price * output - wage * workers as f64;
        if profits > best_profits {
            best_profits = profits;
            best_workers = workers;
        }
    }
    best_workers
}

/// What the monopolist scheduler can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonopolistTask {
    MachineryChange,
    LaborMarket,
    Maximizer,
    Production,
    Targeter,
    Shutdown,
}

/// One production day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonopolistDay {
    pub day: usize,
    pub wage: i64,
    pub workers: u32,
    pub worker_target: u32,
    pub price: f64,
    pub output: f64,
    pub profit: f64,
}

/// End-of-run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonopolistSummary {
    pub maximizer: String,
    pub algorithm: String,
    pub days: usize,
    pub final_wage: i64,
    pub final_workers: u32,
    pub final_target: u32,
    pub tail_average_wage: f64,
    pub tail_average_workers: f64,
    pub optimal_workers: u32,
    pub optimal_wage: i64,
    pub total_profits: f64,
    pub events: usize,
    pub config_hash: String,
    pub trajectory_digest: String,
}

#[derive(Debug, Clone, Copy)]
struct DailyAccount {
    revenues: f64,
    costs: f64,
}

/// Headcount and accounts of the single plant
#[derive(Debug)]
struct Plant {
    workers: u32,
    max_workers: u32,
    productivity: f64,
    weekly_fixed_costs: f64,
    accounts: VecDeque<DailyAccount>,
    window: usize,
}

impl Plant {
    fn book(&mut self, account: DailyAccount) {
        if self.accounts.len() == self.window {
            self.accounts.pop_front();
        }
        self.accounts.push_back(account);
    }
}

impl HeadcountOracle for Plant {
    fn workers(&self) -> u32 {
        self.workers
    }

    fn max_workers(&self) -> u32 {
        self.max_workers
    }

    fn weekly_fixed_costs(&self) -> f64 {
        self.weekly_fixed_costs
    }
}

impl ProfitOracle for Plant {
    fn profits(&self) -> f64 {
        self.revenues() - self.costs()
    }

    fn revenues(&self) -> f64 {
        self.accounts.iter().map(|a| a.revenues).sum()
    }

    fn costs(&self) -> f64 {
        self.accounts.iter().map(|a| a.costs).sum()
    }
}

#[derive(Debug)]
struct Payroll {
    wage: i64,
}

impl WageSetter for Payroll {
    fn current_wage(&self) -> i64 {
        self.wage
    }

    fn set_wage(&mut self, wage: i64) {
        self.wage = wage;
    }
}

/// Linear labor supply: the k-th worker asks `intercept + slope·k`
#[derive(Debug, Clone, Copy)]
struct LaborSupply {
    intercept: i64,
    slope: i64,
}

impl LaborSupply {
    fn headcount(&self, wage: i64, max_workers: u32) -> u32 {
        if wage < self.intercept + self.slope {
            return 0;
        }
        let willing = (wage - self.intercept) / self.slope;
        willing.min(max_workers as i64) as u32
    }
}

/// Everything the handlers touch; kept apart from the scheduler so both can
/// be borrowed while events fire
#[derive(Debug)]
struct World {
    demand_intercept: f64,
    demand_slope: f64,
    labor: LaborSupply,
    plant: Plant,
    payroll: Payroll,
    control: PlantControl,
    pending_change: Option<MachineryChange>,
    log: EventLog,
    trajectory: Vec<MonopolistDay>,
}

impl World {
    fn handle(
        &mut self,
        scheduler: &mut PhaseScheduler<MonopolistTask>,
        task: MonopolistTask,
    ) -> Result<(), ScenarioError> {
        let day = scheduler.current_day();
        match task {
            MonopolistTask::MachineryChange => {
                if let Some(change) = self.pending_change.take() {
                    info!(
                        day,
                        productivity = change.productivity,
                        max_workers = change.max_workers,
                        "machinery changed"
                    );
                    self.plant.productivity = change.productivity;
                    self.plant.max_workers = change.max_workers;
                    self.control.change_in_machinery(
                        &mut scheduler.for_task(MonopolistTask::Maximizer),
                        &self.plant,
                    )?;
                }
            }
            MonopolistTask::LaborMarket => {
                self.plant.workers = self
                    .labor
                    .headcount(self.payroll.wage, self.plant.max_workers);
                scheduler.schedule_tomorrow(Phase::Dawn, task, Priority::Standard);
            }
            MonopolistTask::Maximizer => {
                let outcome = self.control.step_maximizer(
                    &mut scheduler.for_task(task),
                    &self.plant,
                    &self.plant,
                )?;
                self.record_maximizer(day, outcome);
            }
            MonopolistTask::Production => {
                self.produce(day);
                scheduler.schedule_tomorrow(Phase::Production, task, Priority::Standard);
            }
            MonopolistTask::Targeter => {
                let old_wage = self.payroll.wage;
                let installed = self.control.step_targeter(
                    &mut scheduler.for_task(task),
                    &self.plant,
                    &mut self.payroll,
                )?;
                if let Some(new_wage) = installed {
                    self.log.log(ControlEvent::WageChanged {
                        day,
                        owner: OWNER.to_string(),
                        old_wage,
                        new_wage,
                        workers: self.plant.workers,
                        worker_target: self.control.target(),
                    });
                }
            }
            MonopolistTask::Shutdown => {
                if self.control.is_active() {
                    self.control.turn_off()?;
                    info!(day, "workforce control turned off");
                    self.log.log(ControlEvent::TurnedOff {
                        day,
                        owner: OWNER.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn produce(&mut self, day: usize) {
        let workers = self.plant.workers;
        let output = self.plant.productivity * workers as f64;
        let price = (self.demand_intercept - self.demand_slope * output).max(0.0);
        let revenues = price * output;
        let costs = (self.payroll.wage * workers as i64) as f64 + self.plant.weekly_fixed_costs / 7.0;
        self.plant.book(DailyAccount { revenues, costs });
        self.trajectory.push(MonopolistDay {
            day,
            wage: self.payroll.wage,
            workers,
            worker_target: self.control.target(),
            price,
            output,
            profit: revenues - costs,
        });
    }

    fn record_maximizer(&mut self, day: usize, outcome: MaximizerOutcome) {
        let owner = OWNER.to_string();
        match outcome {
            MaximizerOutcome::Retargeted { from, to, profits } if from != to => {
                self.log.log(ControlEvent::TargetChanged {
                    day,
                    owner,
                    old_target: from,
                    new_target: to,
                    profits,
                });
            }
            MaximizerOutcome::ObservationScheduled { days } => {
                self.log.log(ControlEvent::ObservationScheduled {
                    day,
                    owner,
                    days_ahead: days,
                });
            }
            MaximizerOutcome::Deferred => {
                self.log.log(ControlEvent::ObservationDeferred {
                    day,
                    owner,
                    worker_target: self.control.target(),
                });
            }
            _ => {}
        }
    }
}

fn build_maximizer(
    kind: &MaximizerKind,
    algorithm: Box<dyn MaximizationAlgorithm>,
) -> Box<dyn WorkforceMaximizer> {
    match *kind {
        MaximizerKind::SetTargetThenRetry {
            weeks_to_make_observation,
            interval,
        } => Box::new(
            SetTargetThenRetryMaximizer::new(algorithm)
                .with_interval(interval)
                .with_weeks_to_make_observation(weeks_to_make_observation),
        ),
        MaximizerKind::Periodic { interval } => {
            Box::new(PeriodicMaximizer::new(algorithm).with_interval(interval))
        }
        MaximizerKind::FullCapacity => Box::new(FullCapacityMaximizer::new()),
    }
}

/// A runnable monopolist world
///
/// # Example
/// ```
/// use firm_control_core_rs::scenario::{MonopolistConfig, MonopolistScenario};
/// use firm_control_core_rs::workforce::AlgorithmRegistry;
///
/// let config = MonopolistConfig { days: 200, ..Default::default() };
/// let registry = AlgorithmRegistry::with_builtin_algorithms();
/// let mut scenario = MonopolistScenario::new(config, &registry).unwrap();
/// let summary = scenario.run().unwrap();
/// assert_eq!(summary.days, 200);
/// assert_eq!(summary.optimal_workers, 6);
/// ```
#[derive(Debug)]
pub struct MonopolistScenario {
    config: MonopolistConfig,
    config_hash: String,
    algorithm: String,
    scheduler: PhaseScheduler<MonopolistTask>,
    world: World,
    started: bool,
}

impl MonopolistScenario {
    /// Validate `config` and build the world
    ///
    /// The maximization algorithm is built from `registry` by name, or
    /// drawn among its drawable entries with the scenario's RNG when the
    /// config names none.
    pub fn new(config: MonopolistConfig, registry: &AlgorithmRegistry) -> Result<Self, ScenarioError> {
        config.validate()?;
        let config_hash = compute_config_hash(&config)?;
        let mut scheduler = PhaseScheduler::new(config.seed);

        let context = AlgorithmContext {
            weekly_fixed_costs: config.weekly_fixed_costs,
            min_workers: 0,
            max_workers: config.max_workers,
            fixed_target: config.fixed_target,
        };
        let (algorithm_name, algorithm) = match &config.algorithm {
            Some(name) => {
                let algorithm = registry
                    .build(name, &context)
                    .ok_or_else(|| ConfigError::UnknownAlgorithm(name.clone()))?;
                (name.clone(), algorithm)
            }
            None => registry
                .draw(scheduler.rng_mut(), &context)
                .ok_or(ConfigError::NothingDrawable)?,
        };

        let targeter =
            PidTargeter::new(config.targeter_gains).with_speed(config.targeter_speed);
        let mut control = PlantControl::new(targeter, build_maximizer(&config.maximizer, algorithm));
        control.set_initial_wage(config.initial_wage)?;

        let world = World {
            demand_intercept: config.demand_intercept,
            demand_slope: config.demand_slope,
            labor: LaborSupply {
                intercept: config.wage_intercept,
                slope: config.wage_slope,
            },
            plant: Plant {
                workers: 0,
                max_workers: config.max_workers,
                productivity: config.productivity,
                weekly_fixed_costs: config.weekly_fixed_costs,
                accounts: VecDeque::with_capacity(config.profit_window_days),
                window: config.profit_window_days,
            },
            payroll: Payroll {
                wage: config.initial_wage,
            },
            control,
            pending_change: config.machinery_change,
            log: EventLog::new(),
            trajectory: Vec::with_capacity(config.days),
        };

        Ok(Self {
            config,
            config_hash,
            algorithm: algorithm_name,
            scheduler,
            world,
            started: false,
        })
    }

    /// Put the recurring tasks on the agenda; runs once
    fn start(&mut self) -> Result<(), ScenarioError> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        let scheduler = &mut self.scheduler;

        if let Some(change) = &self.world.pending_change {
            if change.day == 0 {
                scheduler.schedule_soon(
                    Phase::Dawn,
                    MonopolistTask::MachineryChange,
                    Priority::BeforeStandard,
                );
            } else {
                scheduler.schedule_another_day(
                    Phase::Dawn,
                    MonopolistTask::MachineryChange,
                    change.day,
                    Priority::BeforeStandard,
                )?;
            }
        }
        if let Some(day) = self.config.shutdown_day {
            if day == 0 {
                scheduler.schedule_soon(Phase::Final, MonopolistTask::Shutdown, Priority::Final);
            } else {
                scheduler.schedule_another_day(
                    Phase::Final,
                    MonopolistTask::Shutdown,
                    day,
                    Priority::Final,
                )?;
            }
        }

        scheduler.schedule_soon(Phase::Dawn, MonopolistTask::LaborMarket, Priority::Standard);
        scheduler.schedule_soon(
            Phase::Production,
            MonopolistTask::Production,
            Priority::Standard,
        );
        self.world.control.start(
            scheduler,
            MonopolistTask::Targeter,
            MonopolistTask::Maximizer,
            &self.world.plant,
        )?;
        debug!(
            algorithm = %self.algorithm,
            maximizer = self.world.control.maximizer().name(),
            "monopolist started"
        );
        Ok(())
    }

    /// Run every event up to and including `last_day`
    pub fn run_until(&mut self, last_day: usize) -> Result<usize, ScenarioError> {
        self.start()?;
        let world = &mut self.world;
        self.scheduler
            .try_run_until(last_day, |scheduler, event| world.handle(scheduler, event.task))
    }

    /// Run the configured number of days and summarize
    pub fn run(&mut self) -> Result<MonopolistSummary, ScenarioError> {
        self.run_until(self.config.days - 1)?;
        self.summary()
    }

    pub fn summary(&self) -> Result<MonopolistSummary, ScenarioError> {
        let trajectory = &self.world.trajectory;
        let tail = &trajectory[trajectory.len().saturating_sub(SUMMARY_TAIL_DAYS)..];
        let tail_len = tail.len().max(1) as f64;
        let optimal_workers = self.config.optimal_workers();

        Ok(MonopolistSummary {
            maximizer: self.world.control.maximizer().name().to_string(),
            algorithm: self.algorithm.clone(),
            days: trajectory.len(),
            final_wage: self.world.payroll.wage,
            final_workers: self.world.plant.workers,
            final_target: self.world.control.target(),
            tail_average_wage: tail.iter().map(|d| d.wage as f64).sum::<f64>() / tail_len,
            tail_average_workers: tail.iter().map(|d| d.workers as f64).sum::<f64>() / tail_len,
            optimal_workers,
            optimal_wage: self.config.wage_for(optimal_workers),
            total_profits: trajectory.iter().map(|d| d.profit).sum(),
            events: self.world.log.len(),
            config_hash: self.config_hash.clone(),
            trajectory_digest: trajectory_digest(trajectory)?,
        })
    }

    pub fn config(&self) -> &MonopolistConfig {
        &self.config
    }

    pub fn algorithm_name(&self) -> &str {
        &self.algorithm
    }

    pub fn trajectory(&self) -> &[MonopolistDay] {
        &self.world.trajectory
    }

    pub fn event_log(&self) -> &EventLog {
        &self.world.log
    }

    pub fn control(&self) -> &PlantControl {
        &self.world.control
    }

    pub fn wage(&self) -> i64 {
        self.world.payroll.wage
    }

    pub fn workers(&self) -> u32 {
        self.world.plant.workers
    }

    pub fn max_workers(&self) -> u32 {
        self.world.plant.max_workers
    }

    pub fn current_day(&self) -> usize {
        self.scheduler.current_day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labor_supply_steps() {
        let labor = LaborSupply {
            intercept: 11,
            slope: 2,
        };
        assert_eq!(labor.headcount(12, 100), 0);
        assert_eq!(labor.headcount(13, 100), 1);
        assert_eq!(labor.headcount(14, 100), 1);
        assert_eq!(labor.headcount(23, 100), 6);
        assert_eq!(labor.headcount(500, 10), 10);
    }

    #[test]
    fn test_profit_window_rolls() {
        let mut plant = Plant {
            workers: 0,
            max_workers: 1,
            productivity: 1.0,
            weekly_fixed_costs: 0.0,
            accounts: VecDeque::new(),
            window: 2,
        };
        for revenues in [10.0, 20.0, 30.0] {
            plant.book(DailyAccount {
                revenues,
                costs: 1.0,
            });
        }
        assert_eq!(plant.revenues(), 50.0);
        assert_eq!(plant.costs(), 2.0);
        assert_eq!(plant.profits(), 48.0);
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let config = MonopolistConfig {
            algorithm: Some("annealing".to_string()),
            ..Default::default()
        };
        let registry = AlgorithmRegistry::with_builtin_algorithms();
        assert!(matches!(
            MonopolistScenario::new(config, &registry),
            Err(ScenarioError::Config(ConfigError::UnknownAlgorithm(_)))
        ));
    }

    #[test]
    fn test_algorithm_drawn_when_unnamed() {
        let config = MonopolistConfig {
            algorithm: None,
            days: 10,
            ..Default::default()
        };
        let registry = AlgorithmRegistry::with_builtin_algorithms();
        let scenario = MonopolistScenario::new(config, &registry).unwrap();
        assert!(registry
            .drawable_names()
            .contains(&scenario.algorithm_name()));
    }

    #[test]
    fn test_one_production_record_per_day() {
        let config = MonopolistConfig {
            days: 30,
            ..Default::default()
        };
        let registry = AlgorithmRegistry::with_builtin_algorithms();
        let mut scenario = MonopolistScenario::new(config, &registry).unwrap();
        scenario.run().unwrap();
        let days: Vec<usize> = scenario.trajectory().iter().map(|d| d.day).collect();
        assert_eq!(days, (0..30).collect::<Vec<_>>());
    }
}
