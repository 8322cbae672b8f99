//! Reference worlds that drive the control core end to end
//!
//! Each scenario owns its scheduler, RNG, plant or department and event
//! log. Nothing is shared between instances, so parameter sweeps can run
//! them on separate threads.

pub mod buyer;
pub mod checkpoint;
pub mod config;
pub mod monopolist;

use crate::inventory::InventoryError;
use crate::scheduler::ScheduleError;
use crate::workforce::ControlError;
use thiserror::Error;

pub use buyer::{BuyerDay, BuyerScenario, BuyerSummary, BuyerTask};
pub use checkpoint::{compute_config_hash, trajectory_digest, verify_config_hash};
pub use config::{
    BuyerConfig, ConfigError, MachineryChange, MaximizerKind, MonopolistConfig, StickinessTuning,
};
pub use monopolist::{
    find_worker_target_that_maximizes_profits, MonopolistDay, MonopolistScenario,
    MonopolistSummary, MonopolistTask,
};

/// Errors raised while building or running a scenario
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("Workforce control failed: {0}")]
    Control(#[from] ControlError),

    #[error("Inventory control failed: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Scheduling failed: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config hash mismatch: expected {expected}, got {actual}")]
    ConfigMismatch { expected: String, actual: String },
}
