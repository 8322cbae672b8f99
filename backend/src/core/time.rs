//! Time management for the simulation
//!
//! The simulation operates in discrete days. Each day is partitioned into
//! named phases executed in a fixed order, and each phase is further split
//! by a secondary priority. This module provides the ordering primitives
//! the scheduler relies on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named stage within a simulated day
///
/// Phases run in declaration order:
/// `Dawn → Think → PrepareToTrade → Trade → Production → AdjustPrices → CleanData → Final`.
///
/// # Example
/// ```
/// use firm_control_core_rs::Phase;
///
/// assert!(Phase::Dawn < Phase::Think);
/// assert!(Phase::AdjustPrices < Phase::Final);
/// assert_eq!(Phase::ALL.len(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Dawn,
    Think,
    PrepareToTrade,
    Trade,
    Production,
    AdjustPrices,
    CleanData,
    Final,
}

impl Phase {
    /// Every phase, in execution order
    pub const ALL: [Phase; 8] = [
        Phase::Dawn,
        Phase::Think,
        Phase::PrepareToTrade,
        Phase::Trade,
        Phase::Production,
        Phase::AdjustPrices,
        Phase::CleanData,
        Phase::Final,
    ];

    /// The first phase of every day
    pub fn first() -> Self {
        Phase::Dawn
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Dawn => "dawn",
            Phase::Think => "think",
            Phase::PrepareToTrade => "prepare_to_trade",
            Phase::Trade => "trade",
            Phase::Production => "production",
            Phase::AdjustPrices => "adjust_prices",
            Phase::CleanData => "clean_data",
            Phase::Final => "final",
        };
        f.write_str(name)
    }
}

/// Secondary ordering of events within one phase
///
/// # Example
/// ```
/// use firm_control_core_rs::Priority;
///
/// assert!(Priority::BeforeStandard < Priority::Standard);
/// assert!(Priority::AfterStandard < Priority::Final);
/// assert_eq!(Priority::default(), Priority::Standard);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    BeforeStandard,
    #[default]
    Standard,
    AfterStandard,
    Final,
}

/// A point on the simulation clock: a day and a phase within it
///
/// Ordered lexicographically, day first.
///
/// # Example
/// ```
/// use firm_control_core_rs::{Phase, SimTime};
///
/// let morning = SimTime::new(3, Phase::Dawn);
/// let evening = SimTime::new(3, Phase::Final);
/// let tomorrow = SimTime::new(4, Phase::Dawn);
/// assert!(morning < evening);
/// assert!(evening < tomorrow);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime {
    /// Day number (0-indexed)
    pub day: usize,
    /// Phase within the day
    pub phase: Phase,
}

impl SimTime {
    pub fn new(day: usize, phase: Phase) -> Self {
        Self { day, phase }
    }

    /// Start of the simulation: day 0, dawn
    pub fn start() -> Self {
        Self::new(0, Phase::first())
    }

    /// The next occurrence of `phase` at or after this time
    ///
    /// Returns today's occurrence if `phase` has not elapsed yet (the current
    /// phase counts as not elapsed), otherwise tomorrow's.
    ///
    /// # Example
    /// ```
    /// use firm_control_core_rs::{Phase, SimTime};
    ///
    /// let now = SimTime::new(5, Phase::Trade);
    /// assert_eq!(now.next_occurrence(Phase::Production), SimTime::new(5, Phase::Production));
    /// assert_eq!(now.next_occurrence(Phase::Trade), SimTime::new(5, Phase::Trade));
    /// assert_eq!(now.next_occurrence(Phase::Think), SimTime::new(6, Phase::Think));
    /// ```
    pub fn next_occurrence(&self, phase: Phase) -> Self {
        if phase >= self.phase {
            Self::new(self.day, phase)
        } else {
            Self::new(self.day + 1, phase)
        }
    }

    /// Same phase `days` days later
    pub fn days_later(&self, days: usize, phase: Phase) -> Self {
        Self::new(self.day + days, phase)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} ({})", self.day, self.phase)
    }
}
