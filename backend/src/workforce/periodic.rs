//! Unconditional periodic maximizer
//!
//! Re-evaluates the target every check interval whether or not headcount
//! has reached it. Suited to noisy plants where waiting for convergence
//! buys nothing.

use crate::core::time::{Phase, Priority};
use crate::scheduler::Agenda;
use crate::workforce::algorithms::{MaximizationAlgorithm, TargetDecision, TargetObservation};
use crate::workforce::{
    validate_target, CheckInterval, ControlError, HeadcountOracle, MaximizerOutcome,
    ProfitOracle, ProfitSnapshot, WorkforceMaximizer, WorkforceTargeter,
};
use tracing::{debug, info};

/// Mean days between evaluations unless configured otherwise
pub const DEFAULT_AVERAGE_CHECK_FREQUENCY: u32 = 20;

#[derive(Debug)]
pub struct PeriodicMaximizer {
    algorithm: Box<dyn MaximizationAlgorithm>,
    interval: CheckInterval,
    last: ProfitSnapshot,
    active: bool,
    started: bool,
}

impl PeriodicMaximizer {
    pub fn new(algorithm: Box<dyn MaximizationAlgorithm>) -> Self {
        Self {
            algorithm,
            interval: CheckInterval::Bernoulli {
                mean_days: DEFAULT_AVERAGE_CHECK_FREQUENCY,
            },
            last: ProfitSnapshot::default(),
            active: true,
            started: false,
        }
    }

    pub fn with_interval(mut self, interval: CheckInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> CheckInterval {
        self.interval
    }

    /// Profits and target at the last evaluation that committed a target;
    /// an evaluation that asks for more time leaves it alone
    pub fn last_snapshot(&self) -> &ProfitSnapshot {
        &self.last
    }

    fn reschedule(&self, agenda: &mut dyn Agenda) -> Result<(), ControlError> {
        let days = self.interval.draw_days(agenda.rng());
        self.interval.reschedule(agenda, Phase::Think, days)?;
        Ok(())
    }

    fn evaluate(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        profits: &dyn ProfitOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<MaximizerOutcome, ControlError> {
        if !self.active || !self.started {
            return Ok(MaximizerOutcome::Idle);
        }

        let workers = headcount.workers();
        let target = targeter.target();
        if target != workers && workers == 0 {
            debug!(worker_target = target, "no workers yet, evaluating tomorrow");
            agenda.schedule_tomorrow(Phase::Think, Priority::Standard);
            return Ok(MaximizerOutcome::Deferred);
        }

        let new = ProfitSnapshot::read(profits, target);
        let observation = TargetObservation {
            current_target: target,
            new_profits: new.profits,
            new_revenues: new.revenues,
            new_costs: new.costs,
            old_revenues: self.last.revenues,
            old_costs: self.last.costs,
            old_target: self.last.target,
            old_profits: self.last.profits,
        };

        let outcome = match self.algorithm.choose_worker_target(&observation) {
            TargetDecision::NeedMoreTime => {
                debug!("algorithm asked for more time");
                MaximizerOutcome::NeedMoreTime
            }
            TargetDecision::Retarget(future) => {
                validate_target(future, headcount)?;
                info!(
                    old_profits = self.last.profits,
                    new_profits = new.profits,
                    old_target = self.last.target,
                    new_target = future,
                    "worker target chosen"
                );
                targeter.set_target(future);
                self.last = new;
                MaximizerOutcome::Retargeted {
                    from: target,
                    to: future,
                    profits: new.profits,
                }
            }
        };
        self.reschedule(agenda)?;
        Ok(outcome)
    }
}

impl WorkforceMaximizer for PeriodicMaximizer {
    fn start(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<(), ControlError> {
        if !self.active {
            return Err(ControlError::AlreadyTurnedOff);
        }
        targeter.set_target(1.min(headcount.max_workers()));
        if !self.started {
            self.started = true;
            self.reschedule(agenda)?;
        }
        Ok(())
    }

    fn step(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        profits: &dyn ProfitOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<MaximizerOutcome, ControlError> {
        let result = self.evaluate(agenda, headcount, profits, targeter);
        if result.is_err() {
            // a failed evaluation rescheduled nothing
            self.started = false;
        }
        result
    }

    /// Technology changes are picked up at the next evaluation; a stopped
    /// evaluation chain is started again
    fn change_in_machinery(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<(), ControlError> {
        self.algorithm.reset(headcount);
        if self.active && !self.started {
            self.start(agenda, headcount, targeter)?;
        }
        Ok(())
    }

    fn turn_off(&mut self) -> Result<(), ControlError> {
        if !self.active {
            return Err(ControlError::AlreadyTurnedOff);
        }
        self.active = false;
        self.algorithm.turn_off();
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn name(&self) -> &'static str {
        "periodic"
    }
}
