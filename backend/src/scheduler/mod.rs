//! Deterministic phase scheduler
//!
//! The single synchronization primitive of the simulation: every department
//! step, controller update and maximizer check is an event in one queue,
//! ordered by `(day, phase, priority, submission sequence)`.
//!
//! Recurring behavior is expressed by a task re-submitting itself at the end
//! of its own step; there is no "repeat every N days" primitive and no
//! cancellation. See [`queue`] for the queue itself and [`agenda`] for the
//! per-task view handed to components.

pub mod agenda;
pub mod queue;

use thiserror::Error;

pub use agenda::{Agenda, AgendaRequest, RecordingAgenda, TaskAgenda};
pub use queue::{PhaseScheduler, ScheduledEvent};

/// Rejected scheduling requests
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("Days ahead must be positive, got {0}")]
    NonPositiveDelay(usize),

    #[error("Daily probability must lie in (0, 1], got {0}")]
    InvalidProbability(f64),
}
