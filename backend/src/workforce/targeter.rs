//! PID wage targeter (the fast loop)
//!
//! Every day at `AdjustPrices` the targeter feeds (target, headcount) to its
//! PID, rounds the output to a whole wage and installs it if it changed.

use crate::controller::{PidController, PidGains};
use crate::core::time::{Phase, Priority};
use crate::scheduler::Agenda;
use crate::workforce::{ControlError, HeadcountOracle, WageSetter, WorkforceTargeter};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Drives headcount to target by moving the wage
///
/// # Example
/// ```
/// use firm_control_core_rs::controller::PidGains;
/// use firm_control_core_rs::scheduler::RecordingAgenda;
/// use firm_control_core_rs::workforce::{HeadcountOracle, PidTargeter, WageSetter, WorkforceTargeter};
///
/// struct Workforce(u32);
/// impl HeadcountOracle for Workforce {
///     fn workers(&self) -> u32 { self.0 }
///     fn max_workers(&self) -> u32 { 100 }
/// }
///
/// struct Payroll(i64);
/// impl WageSetter for Payroll {
///     fn current_wage(&self) -> i64 { self.0 }
///     fn set_wage(&mut self, wage: i64) { self.0 = wage; }
/// }
///
/// let mut payroll = Payroll(0);
/// let mut agenda = RecordingAgenda::new(1);
/// let mut targeter = PidTargeter::new(PidGains::new(1.0, 0.0, 0.0));
/// targeter.set_target(5);
///
/// let installed = targeter.step(&mut agenda, &Workforce(0), &mut payroll).unwrap();
/// assert_eq!(installed, Some(5));
/// assert_eq!(payroll.0, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidTargeter {
    pid: PidController,
    target: u32,
    speed: u32,
    active: bool,
}

impl PidTargeter {
    pub fn new(gains: PidGains) -> Self {
        Self {
            pid: PidController::new(gains),
            target: 0,
            speed: 0,
            active: true,
        }
    }

    /// Step every `speed + 1` days instead of daily
    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    /// Restart the controller from `wage`
    pub fn set_initial_wage(&mut self, wage: i64) -> Result<(), ControlError> {
        if wage < 0 {
            return Err(ControlError::NegativeWage(wage));
        }
        self.pid.set_offset(wage as f64);
        Ok(())
    }

    /// Schedule the first step
    pub fn start(&mut self, agenda: &mut dyn Agenda) -> Result<(), ControlError> {
        if !self.active {
            return Err(ControlError::AlreadyTurnedOff);
        }
        agenda.schedule_soon(Phase::AdjustPrices, Priority::Standard);
        Ok(())
    }

    /// One scheduled step; returns the wage installed, if it changed
    pub fn step(
        &mut self,
        agenda: &mut dyn Agenda,
        headcount: &dyn HeadcountOracle,
        wages: &mut dyn WageSetter,
    ) -> Result<Option<i64>, ControlError> {
        if !self.active {
            return Ok(None);
        }

        let old_wage = wages.current_wage();
        let workers = headcount.workers();
        self.pid
            .adjust(self.target as f64, workers as f64, self.active);
        let new_wage = self.pid.current_mv().round() as i64;

        let installed = if new_wage != old_wage && new_wage >= 0 {
            debug!(
                worker_target = self.target,
                workers,
                old_wage,
                new_wage,
                "wage changed"
            );
            wages.set_wage(new_wage);
            Some(new_wage)
        } else {
            None
        };

        if self.speed == 0 {
            agenda.schedule_tomorrow(Phase::AdjustPrices, Priority::Standard);
        } else {
            agenda.schedule_another_day(
                Phase::AdjustPrices,
                self.speed as usize + 1,
                Priority::Standard,
            )?;
        }
        Ok(installed)
    }

    pub fn turn_off(&mut self) -> Result<(), ControlError> {
        if !self.active {
            return Err(ControlError::AlreadyTurnedOff);
        }
        self.active = false;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn controller(&self) -> &PidController {
        &self.pid
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }
}

impl WorkforceTargeter for PidTargeter {
    fn target(&self) -> u32 {
        self.target
    }

    fn set_target(&mut self, target: u32) {
        self.target = target;
    }
}
