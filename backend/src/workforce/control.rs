//! Plant control: a targeter and a maximizer working as one
//!
//! The rest of the firm talks to a plant's hiring through
//! [`WorkforceControl`] and never sees which targeter or maximizer is
//! inside.

use crate::scheduler::{Agenda, PhaseScheduler};
use crate::workforce::{
    validate_target, ControlError, HeadcountOracle, MaximizerOutcome, PidTargeter, ProfitOracle,
    WageSetter, WorkforceMaximizer, WorkforceTargeter,
};

/// What other departments may ask of a plant's hiring
pub trait WorkforceControl {
    /// Workers missing (negative) or in excess (positive) of the target
    fn estimate_demand_gap(&self, workers: u32) -> i64;

    /// Highest wage currently offered
    fn max_price(&self) -> i64;

    fn target(&self) -> u32;

    fn set_target(&mut self, target: u32, headcount: &dyn HeadcountOracle) -> Result<(), ControlError>;

    fn turn_off(&mut self) -> Result<(), ControlError>;
}

/// [`PidTargeter`] plus any [`WorkforceMaximizer`]
#[derive(Debug)]
pub struct PlantControl {
    targeter: PidTargeter,
    maximizer: Box<dyn WorkforceMaximizer>,
    wage: i64,
}

impl PlantControl {
    pub fn new(targeter: PidTargeter, maximizer: Box<dyn WorkforceMaximizer>) -> Self {
        Self {
            targeter,
            maximizer,
            wage: 0,
        }
    }

    /// Restart the targeter from `wage`
    pub fn set_initial_wage(&mut self, wage: i64) -> Result<(), ControlError> {
        self.targeter.set_initial_wage(wage)?;
        self.wage = wage;
        Ok(())
    }

    /// Start both loops, each as its own task on `scheduler`
    pub fn start<T: Clone>(
        &mut self,
        scheduler: &mut PhaseScheduler<T>,
        targeter_task: T,
        maximizer_task: T,
        headcount: &dyn HeadcountOracle,
    ) -> Result<(), ControlError> {
        self.targeter.start(&mut scheduler.for_task(targeter_task))?;
        self.maximizer.start(
            &mut scheduler.for_task(maximizer_task),
            headcount,
            &mut self.targeter,
        )
    }

    /// Run the targeter's scheduled step; returns the newly installed wage
    pub fn step_targeter(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        wages: &mut dyn WageSetter,
    ) -> Result<Option<i64>, ControlError> {
        let installed = self.targeter.step(agenda, headcount, wages)?;
        if let Some(wage) = installed {
            self.wage = wage;
        }
        Ok(installed)
    }

    /// Run the maximizer's scheduled step
    pub fn step_maximizer(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        profits: &dyn ProfitOracle,
    ) -> Result<MaximizerOutcome, ControlError> {
        self.maximizer
            .step(agenda, headcount, profits, &mut self.targeter)
    }

    pub fn change_in_machinery(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
    ) -> Result<(), ControlError> {
        self.maximizer
            .change_in_machinery(agenda, headcount, &mut self.targeter)
    }

    pub fn targeter(&self) -> &PidTargeter {
        &self.targeter
    }

    pub fn maximizer(&self) -> &dyn WorkforceMaximizer {
        self.maximizer.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.targeter.is_active() && self.maximizer.is_active()
    }
}

impl WorkforceControl for PlantControl {
    fn estimate_demand_gap(&self, workers: u32) -> i64 {
        workers as i64 - self.targeter.target() as i64
    }

    fn max_price(&self) -> i64 {
        self.wage
    }

    fn target(&self) -> u32 {
        self.targeter.target()
    }

    fn set_target(&mut self, target: u32, headcount: &dyn HeadcountOracle) -> Result<(), ControlError> {
        validate_target(target, headcount)?;
        self.targeter.set_target(target);
        Ok(())
    }

    /// Turns off both loops; the first failure is reported after both were
    /// attempted
    fn turn_off(&mut self) -> Result<(), ControlError> {
        let targeter = self.targeter.turn_off();
        let maximizer = self.maximizer.turn_off();
        targeter.and(maximizer)
    }
}
