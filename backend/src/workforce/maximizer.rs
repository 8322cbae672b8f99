//! Set-target-then-retry maximizer (the slow loop)
//!
//! Stages, in the order a healthy cycle visits them:
//!
//! ```text
//!            start()
//!               │
//!               ▼
//!   ┌──► WaitingForTarget ──(headcount == target)──► AtTargetPendingObservation
//!   │           ▲                                                 │
//!   │           └────────────(headcount != target)────────────────┤
//!   │                                                             ▼ weeks later
//!   └──────────────(Retarget)─────────────────────────────── Observing ◄─┐
//!                                                                 └──────┘
//!                                                              NeedMoreTime
//! ```
//!
//! Profits are only read in `Observing`, and `Observing` is only reached
//! after the targeter has held the target for a full observation cycle, so
//! the comparison is between settled states.

use crate::core::time::{Phase, Priority};
use crate::scheduler::Agenda;
use crate::workforce::algorithms::{MaximizationAlgorithm, TargetDecision, TargetObservation};
use crate::workforce::{
    validate_target, CheckInterval, ControlError, HeadcountOracle, MaximizerOutcome,
    ProfitOracle, ProfitSnapshot, WorkforceMaximizer, WorkforceTargeter,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Default number of weeks the firm is left to settle before profits count
pub const DEFAULT_WEEKS_TO_MAKE_OBSERVATION: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaximizerStage {
    /// Not started, or turned off
    Inactive,
    WaitingForTarget,
    AtTargetPendingObservation,
    Observing,
}

impl fmt::Display for MaximizerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MaximizerStage::Inactive => "inactive",
            MaximizerStage::WaitingForTarget => "waiting_for_target",
            MaximizerStage::AtTargetPendingObservation => "at_target_pending_observation",
            MaximizerStage::Observing => "observing",
        };
        f.write_str(name)
    }
}

/// Re-targets only after the current target has been reached and held
#[derive(Debug)]
pub struct SetTargetThenRetryMaximizer {
    algorithm: Box<dyn MaximizationAlgorithm>,
    interval: CheckInterval,
    weeks_to_make_observation: u32,
    stage: MaximizerStage,
    old: ProfitSnapshot,
    active: bool,
    chain_scheduled: bool,
}

impl SetTargetThenRetryMaximizer {
    pub fn new(algorithm: Box<dyn MaximizationAlgorithm>) -> Self {
        Self {
            algorithm,
            interval: CheckInterval::default(),
            weeks_to_make_observation: DEFAULT_WEEKS_TO_MAKE_OBSERVATION,
            stage: MaximizerStage::Inactive,
            old: ProfitSnapshot::default(),
            active: true,
            chain_scheduled: false,
        }
    }

    pub fn with_interval(mut self, interval: CheckInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_weeks_to_make_observation(mut self, weeks: u32) -> Self {
        self.weeks_to_make_observation = weeks;
        self
    }

    pub fn stage(&self) -> MaximizerStage {
        self.stage
    }

    /// Snapshot taken at the last commit
    pub fn old_snapshot(&self) -> &ProfitSnapshot {
        &self.old
    }

    pub fn interval(&self) -> CheckInterval {
        self.interval
    }

    pub fn weeks_to_make_observation(&self) -> u32 {
        self.weeks_to_make_observation
    }

    pub fn algorithm(&self) -> &dyn MaximizationAlgorithm {
        self.algorithm.as_ref()
    }

    /// Days from a check to the profit observation it schedules
    fn observation_delay(&self, interval_days: usize) -> usize {
        interval_days + 7 * self.weeks_to_make_observation as usize
    }

    fn reschedule(&self, agenda: &mut dyn Agenda, days: usize) -> Result<(), ControlError> {
        self.interval.reschedule(agenda, Phase::Think, days)?;
        Ok(())
    }

    fn advance(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        profits: &dyn ProfitOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<MaximizerOutcome, ControlError> {
        if !self.active || self.stage == MaximizerStage::Inactive {
            return Ok(MaximizerOutcome::Idle);
        }

        let next_check = self.interval.draw_days(agenda.rng());
        let workers = headcount.workers();
        let target = targeter.target();

        if workers != target {
            self.stage = MaximizerStage::WaitingForTarget;
            if workers == 0 && target > 0 {
                debug!(worker_target = target, "no workers yet, checking again tomorrow");
                agenda.schedule_tomorrow(Phase::Think, Priority::Standard);
                return Ok(MaximizerOutcome::Deferred);
            }
            self.reschedule(agenda, next_check)?;
            return Ok(MaximizerOutcome::WaitingForTarget { workers, target });
        }

        if self.stage == MaximizerStage::WaitingForTarget {
            self.stage = MaximizerStage::AtTargetPendingObservation;
            let days = self.observation_delay(next_check);
            self.reschedule(agenda, days)?;
            return Ok(MaximizerOutcome::ObservationScheduled { days });
        }

        self.stage = MaximizerStage::Observing;
        let new = ProfitSnapshot::read(profits, target);
        let observation = TargetObservation {
            current_target: target,
            new_profits: new.profits,
            new_revenues: new.revenues,
            new_costs: new.costs,
            old_revenues: self.old.revenues,
            old_costs: self.old.costs,
            old_target: self.old.target,
            old_profits: self.old.profits,
        };

        match self.algorithm.choose_worker_target(&observation) {
            TargetDecision::NeedMoreTime => {
                let days = self.observation_delay(next_check);
                self.reschedule(agenda, days)?;
                Ok(MaximizerOutcome::NeedMoreTime)
            }
            TargetDecision::Retarget(future) => {
                validate_target(future, headcount)?;
                info!(
                    old_profits = self.old.profits,
                    new_profits = new.profits,
                    old_target = self.old.target,
                    new_target = future,
                    "worker target chosen"
                );
                self.old = new;
                targeter.set_target(future);
                self.stage = MaximizerStage::WaitingForTarget;
                self.reschedule(agenda, next_check)?;
                Ok(MaximizerOutcome::Retargeted {
                    from: target,
                    to: future,
                    profits: new.profits,
                })
            }
        }
    }
}

impl WorkforceMaximizer for SetTargetThenRetryMaximizer {
    fn start(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<(), ControlError> {
        if !self.active {
            return Err(ControlError::AlreadyTurnedOff);
        }
        let first_target = 1.min(headcount.max_workers());
        targeter.set_target(first_target);
        self.old = ProfitSnapshot {
            profits: -headcount.weekly_fixed_costs(),
            revenues: 0.0,
            costs: 0.0,
            target: 0,
        };
        self.stage = MaximizerStage::WaitingForTarget;

        // a restart reuses the chain already on the agenda
        if !self.chain_scheduled {
            agenda.schedule_soon(Phase::Think, Priority::Standard);
            self.chain_scheduled = true;
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
        let result = self.advance(agenda, headcount, profits, targeter);
        if result.is_err() {
            // a failed step rescheduled nothing
            self.chain_scheduled = false;
        }
        result
    }

    fn change_in_machinery(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<(), ControlError> {
        self.algorithm.reset(headcount);
        self.start(agenda, headcount, targeter)
    }

    fn turn_off(&mut self) -> Result<(), ControlError> {
        if !self.active {
            return Err(ControlError::AlreadyTurnedOff);
        }
        self.active = false;
        self.stage = MaximizerStage::Inactive;
        self.algorithm.turn_off();
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn name(&self) -> &'static str {
        "set_target_then_retry"
    }
}
