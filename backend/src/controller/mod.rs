//! Feedback controllers
//!
//! Controllers compute a manipulated value (MV: a price, a wage) that drives a
//! measured value toward a target. They do not schedule themselves; the
//! strategy that embeds a controller calls `adjust` from its own scheduled
//! step, and the controller's sampling speed decides how often the output
//! actually moves.
//!
//! - [`pid`]: the plain PID controller with stickiness and anti-windup
//! - [`cascade`]: two PIDs in series, managing a stock through a flow
//! - [`tuning`]: ITAE measurement and a stickiness hill-climber

pub mod cascade;
pub mod pid;
pub mod tuning;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cascade::CascadeController;
pub use pid::{AdmissibleRange, PidController, PidGains};
pub use tuning::{ItaeCounter, StickinessTuner};

/// Errors raised by controller inputs
#[derive(Debug, Error, PartialEq)]
pub enum ControllerError {
    #[error("Controller input needs at least one target and one input")]
    EmptyInput,

    #[error("No target at position {0}")]
    MissingTarget(usize),

    #[error("No input at position {0}")]
    MissingInput(usize),
}

/// Replace NaN and infinities with zero
///
/// Derivative and sensitivity estimates can blow up on a locally flat
/// objective; such values must never reach a decision.
///
/// # Example
/// ```
/// use firm_control_core_rs::controller::finite_or_zero;
///
/// assert_eq!(finite_or_zero(f64::NAN), 0.0);
/// assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
/// assert_eq!(finite_or_zero(-2.5), -2.5);
/// ```
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Packed controller input: set points and measured values by position
///
/// A PID reads target 0 and input 0. A cascade reads target 0 (stock
/// target), input 0 (stock) and input 1 (flow); in inventory-cascade mode it
/// also reads target 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerInput {
    targets: Vec<f64>,
    inputs: Vec<f64>,
}

impl ControllerInput {
    /// Build from explicit target and input lists
    ///
    /// # Errors
    /// `ControllerError::EmptyInput` if either list is empty
    pub fn new(targets: Vec<f64>, inputs: Vec<f64>) -> Result<Self, ControllerError> {
        if targets.is_empty() || inputs.is_empty() {
            return Err(ControllerError::EmptyInput);
        }
        Ok(Self { targets, inputs })
    }

    /// One target, one input
    pub fn simple(target: f64, input: f64) -> Self {
        Self {
            targets: vec![target],
            inputs: vec![input],
        }
    }

    /// Stock target with the current stock and flow
    pub fn cascade(stock_target: f64, stock: f64, flow: f64) -> Self {
        Self {
            targets: vec![stock_target],
            inputs: vec![stock, flow],
        }
    }

    pub fn target(&self, position: usize) -> Result<f64, ControllerError> {
        self.targets
            .get(position)
            .copied()
            .ok_or(ControllerError::MissingTarget(position))
    }

    pub fn input(&self, position: usize) -> Result<f64, ControllerError> {
        self.inputs
            .get(position)
            .copied()
            .ok_or(ControllerError::MissingInput(position))
    }

    pub fn set_target(&mut self, position: usize, value: f64) -> Result<(), ControllerError> {
        let slot = self
            .targets
            .get_mut(position)
            .ok_or(ControllerError::MissingTarget(position))?;
        *slot = value;
        Ok(())
    }

    pub fn set_input(&mut self, position: usize, value: f64) -> Result<(), ControllerError> {
        let slot = self
            .inputs
            .get_mut(position)
            .ok_or(ControllerError::MissingInput(position))?;
        *slot = value;
        Ok(())
    }
}

/// Common surface of every controller
pub trait Controller {
    /// Feed the controller one sample
    ///
    /// Returns `Ok(true)` if the MV was recomputed, `Ok(false)` if the
    /// controller was inactive or is still waiting out its sampling speed.
    fn adjust_input(&mut self, input: &ControllerInput, active: bool)
        -> Result<bool, ControllerError>;

    /// The latest output
    fn current_mv(&self) -> f64;

    /// The output the controller starts from
    fn offset(&self) -> f64;

    /// Reset the controller around a new starting output
    fn set_offset(&mut self, offset: f64);

    /// Number of samples skipped between recomputations
    fn speed(&self) -> u32;

    fn set_speed(&mut self, speed: u32);
}
