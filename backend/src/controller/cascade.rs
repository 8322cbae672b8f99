//! Cascade controller
//!
//! Two PIDs in series. The master looks at the stock and decides what flow
//! would bring it to target; the slave looks at the actual flow and moves
//! the MV (typically an offer price) until the flow matches.

use crate::controller::{Controller, ControllerError, ControllerInput, PidController, PidGains};
use serde::{Deserialize, Serialize};

/// Master/slave PID pair managing a stock through its flow
///
/// Both stages keep a non-negative output with windup stop.
///
/// # Example
/// ```
/// use firm_control_core_rs::controller::{CascadeController, PidGains};
///
/// let mut cascade = CascadeController::new(PidGains::new(0.1, 0.02, 0.0), PidGains::new(0.5, 0.1, 0.0));
/// // stock below target: the master asks for inflow, the slave raises the MV
/// cascade.adjust(10.0, 2.0, 0.0, true);
/// assert!(cascade.flow_target() > 0.0);
/// assert!(cascade.current_mv() > 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeController {
    master: PidController,
    slave: PidController,
    flow_target: f64,
    inventory_cascade_mode: bool,
}

impl CascadeController {
    pub fn new(master_gains: PidGains, slave_gains: PidGains) -> Self {
        Self {
            master: PidController::new(master_gains),
            slave: PidController::new(slave_gains),
            flow_target: 0.0,
            inventory_cascade_mode: false,
        }
    }

    /// Read the slave's input as `target(1) − input(1)` from packed inputs
    pub fn with_inventory_cascade_mode(mut self, enabled: bool) -> Self {
        self.inventory_cascade_mode = enabled;
        self
    }

    /// One sample: master on (stock target, stock), slave on (flow target, flow)
    pub fn adjust(&mut self, stock_target: f64, stock: f64, flow: f64, active: bool) -> bool {
        if !active {
            return false;
        }
        self.master.adjust(stock_target, stock, active);
        self.flow_target = self.master.current_mv();
        self.slave.adjust(self.flow_target, flow, active)
    }

    /// The slave's output
    pub fn current_mv(&self) -> f64 {
        self.slave.current_mv()
    }

    /// Flow the master currently asks for
    pub fn flow_target(&self) -> f64 {
        self.flow_target
    }

    pub fn master(&self) -> &PidController {
        &self.master
    }

    pub fn slave(&self) -> &PidController {
        &self.slave
    }

    pub fn set_master_gains(&mut self, gains: PidGains) {
        self.master.set_gains(gains);
    }

    pub fn set_slave_gains(&mut self, gains: PidGains) {
        self.slave.set_gains(gains);
    }

    pub fn inventory_cascade_mode(&self) -> bool {
        self.inventory_cascade_mode
    }
}

impl Controller for CascadeController {
    fn adjust_input(
        &mut self,
        input: &ControllerInput,
        active: bool,
    ) -> Result<bool, ControllerError> {
        let stock_target = input.target(0)?;
        let stock = input.input(0)?;
        let flow = if self.inventory_cascade_mode {
            input.target(1)? - input.input(1)?
        } else {
            input.input(1)?
        };
        Ok(self.adjust(stock_target, stock, flow, active))
    }

    fn current_mv(&self) -> f64 {
        self.slave.current_mv()
    }

    fn offset(&self) -> f64 {
        self.slave.offset()
    }

    /// Only the slave carries the output offset
    fn set_offset(&mut self, offset: f64) {
        self.slave.set_offset(offset);
    }

    fn speed(&self) -> u32 {
        self.master.speed()
    }

    fn set_speed(&mut self, speed: u32) {
        self.master.set_speed(speed);
        self.slave.set_speed(speed);
    }
}
