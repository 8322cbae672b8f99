//! Full-capacity maximizer
//!
//! Targets the technological maximum and never reconsiders, except when the
//! technology itself changes.

use crate::scheduler::Agenda;
use crate::workforce::{
    ControlError, HeadcountOracle, MaximizerOutcome, ProfitOracle, WorkforceMaximizer,
    WorkforceTargeter,
};
use tracing::info;

#[derive(Debug, Clone)]
pub struct FullCapacityMaximizer {
    active: bool,
}

impl FullCapacityMaximizer {
    pub fn new() -> Self {
        Self { active: true }
    }

    fn target_max(
        &self,
        headcount: &dyn HeadcountOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<(), ControlError> {
        if !self.active {
            return Err(ControlError::AlreadyTurnedOff);
        }
        let max = headcount.max_workers();
        info!(new_target = max, "targeting full capacity");
        targeter.set_target(max);
        Ok(())
    }
}

impl Default for FullCapacityMaximizer {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkforceMaximizer for FullCapacityMaximizer {
    fn start(
        &mut self,
        _agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<(), ControlError> {
        self.target_max(headcount, targeter)
    }

    /// Never scheduled; a stray call does nothing
    fn step(
        &mut self,
        _agenda: &mut dyn Agenda,
        _headcount: &dyn HeadcountOracle,
        _profits: &dyn ProfitOracle,
        _targeter: &mut dyn WorkforceTargeter,
    ) -> Result<MaximizerOutcome, ControlError> {
        Ok(MaximizerOutcome::Idle)
    }

    fn change_in_machinery(
        &mut self,
        _agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        targeter: &mut dyn WorkforceTargeter,
    ) -> Result<(), ControlError> {
        self.target_max(headcount, targeter)
    }

    fn turn_off(&mut self) -> Result<(), ControlError> {
        if !self.active {
            return Err(ControlError::AlreadyTurnedOff);
        }
        self.active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn name(&self) -> &'static str {
        "full_capacity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::RecordingAgenda;

    struct Plant(u32);

    impl HeadcountOracle for Plant {
        fn workers(&self) -> u32 {
            0
        }
        fn max_workers(&self) -> u32 {
            self.0
        }
    }

    struct Target(u32);

    impl WorkforceTargeter for Target {
        fn target(&self) -> u32 {
            self.0
        }
        fn set_target(&mut self, target: u32) {
            self.0 = target;
        }
    }

    #[test]
    fn test_targets_maximum_and_never_schedules() {
        let mut agenda = RecordingAgenda::new(1);
        let mut target = Target(0);
        let mut maximizer = FullCapacityMaximizer::new();
        maximizer.start(&mut agenda, &Plant(12), &mut target).unwrap();
        assert_eq!(target.0, 12);
        maximizer
            .change_in_machinery(&mut agenda, &Plant(20), &mut target)
            .unwrap();
        assert_eq!(target.0, 20);
        assert!(agenda.requests().is_empty());
    }
}
