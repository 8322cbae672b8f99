//! Firm Control Core - Rust Engine
//!
//! Discrete-event control core for simulated firms: departments that hire,
//! buy and price by feedback control, all driven by one deterministic phased
//! scheduler.
//!
//! # Architecture
//!
//! - **core**: Day phases, priorities and simulated time
//! - **rng**: Deterministic random number generation
//! - **scheduler**: Phased event queue and per-task agendas
//! - **controller**: PID and cascade controllers, gain tuning
//! - **inventory**: Inventory target policies and level rating
//! - **stats**: Trend estimation used by adaptive algorithms
//! - **workforce**: Two-timescale workforce target control
//! - **models**: Control event log
//! - **scenario**: Reference worlds, configs and run fingerprints
//!
//! # Critical Invariants
//!
//! 1. Events fire in `(day, phase, priority, sequence)` order
//! 2. All randomness is deterministic (seeded RNG)
//! 3. A turned-off component never acts or reschedules again
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod controller;
pub mod core;
pub mod inventory;
pub mod models;
pub mod rng;
pub mod scenario;
pub mod scheduler;
pub mod stats;
pub mod workforce;

// Re-exports for convenience
pub use controller::{CascadeController, Controller, ControllerInput, PidController, PidGains};
pub use core::time::{Phase, Priority, SimTime};
pub use inventory::{InventoryControl, InventoryLevel, InventoryTargetPolicy};
pub use models::{ControlEvent, EventLog};
pub use rng::RngManager;
pub use scenario::{
    BuyerConfig, BuyerScenario, MonopolistConfig, MonopolistScenario, ScenarioError,
};
pub use scheduler::{Agenda, PhaseScheduler, ScheduleError, ScheduledEvent};
pub use workforce::{
    CheckInterval, ControlError, PidTargeter, PlantControl, SetTargetThenRetryMaximizer,
    WorkforceControl, WorkforceMaximizer,
};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn firm_control_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::scenario::PyMonopolistScenario>()?;
    m.add_class::<ffi::scenario::PyBuyerScenario>()?;
    m.add_function(wrap_pyfunction!(ffi::scenario::optimal_worker_target, m)?)?;
    Ok(())
}
