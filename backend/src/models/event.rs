//! Control event log for replay and diagnostics.
//!
//! Every decision a control component takes in a scenario is recorded as a
//! [`ControlEvent`]. The components themselves return outcomes; the world
//! that runs them turns those outcomes into events, so the log is the single
//! place to look when asking "what did the firm decide, and when".
//!
//! # Event Types
//!
//! - **Wage**: the targeter installed a new wage
//! - **Target**: a maximizer committed a new worker target
//! - **Observation**: a maximizer scheduled or deferred a profit observation
//! - **Price**: a purchasing department moved its offer price
//! - **Inventory**: the stock was rated after an inventory change
//! - **Shutdown**: a component was turned off
//!
//! # Example
//!
//! ```rust
//! use firm_control_core_rs::models::ControlEvent;
//!
//! let event = ControlEvent::WageChanged {
//!     day: 10,
//!     owner: "plant".to_string(),
//!     old_wage: 17,
//!     new_wage: 19,
//!     workers: 3,
//!     worker_target: 5,
//! };
//!
//! assert_eq!(event.day(), 10);
//! assert_eq!(event.event_type(), "WageChanged");
//! ```

use crate::inventory::InventoryLevel;
use serde::{Deserialize, Serialize};

/// One control decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControlEvent {
    WageChanged {
        day: usize,
        owner: String,
        old_wage: i64,
        new_wage: i64,
        workers: u32,
        worker_target: u32,
    },

    /// A maximizer committed a new worker target
    TargetChanged {
        day: usize,
        owner: String,
        old_target: u32,
        new_target: u32,
        profits: f64,
    },

    ObservationScheduled {
        day: usize,
        owner: String,
        days_ahead: usize,
    },

    /// Headcount still zero with a positive target
    ObservationDeferred {
        day: usize,
        owner: String,
        worker_target: u32,
    },

    PriceChanged {
        day: usize,
        owner: String,
        old_price: i64,
        new_price: i64,
    },

    InventoryRated {
        day: usize,
        owner: String,
        stock: u64,
        stock_target: f64,
        level: InventoryLevel,
    },

    TurnedOff {
        day: usize,
        owner: String,
    },
}

impl ControlEvent {
    pub fn day(&self) -> usize {
        match self {
            ControlEvent::WageChanged { day, .. } => *day,
            ControlEvent::TargetChanged { day, .. } => *day,
            ControlEvent::ObservationScheduled { day, .. } => *day,
            ControlEvent::ObservationDeferred { day, .. } => *day,
            ControlEvent::PriceChanged { day, .. } => *day,
            ControlEvent::InventoryRated { day, .. } => *day,
            ControlEvent::TurnedOff { day, .. } => *day,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            ControlEvent::WageChanged { .. } => "WageChanged",
            ControlEvent::TargetChanged { .. } => "TargetChanged",
            ControlEvent::ObservationScheduled { .. } => "ObservationScheduled",
            ControlEvent::ObservationDeferred { .. } => "ObservationDeferred",
            ControlEvent::PriceChanged { .. } => "PriceChanged",
            ControlEvent::InventoryRated { .. } => "InventoryRated",
            ControlEvent::TurnedOff { .. } => "TurnedOff",
        }
    }

    /// Name of the plant or department that took the decision
    pub fn owner(&self) -> &str {
        match self {
            ControlEvent::WageChanged { owner, .. }
            | ControlEvent::TargetChanged { owner, .. }
            | ControlEvent::ObservationScheduled { owner, .. }
            | ControlEvent::ObservationDeferred { owner, .. }
            | ControlEvent::PriceChanged { owner, .. }
            | ControlEvent::InventoryRated { owner, .. }
            | ControlEvent::TurnedOff { owner, .. } => owner,
        }
    }
}

/// Append-only list of control events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<ControlEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: ControlEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[ControlEvent] {
        &self.events
    }

    pub fn events_on_day(&self, day: usize) -> Vec<&ControlEvent> {
        self.events.iter().filter(|e| e.day() == day).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&ControlEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_owner(&self, owner: &str) -> Vec<&ControlEvent> {
        self.events.iter().filter(|e| e.owner() == owner).collect()
    }

    /// Number of events of each type, sorted by type name
    pub fn counts_by_type(&self) -> Vec<(&'static str, usize)> {
        let mut counts: std::collections::BTreeMap<&'static str, usize> =
            std::collections::BTreeMap::new();
        for event in &self.events {
            *counts.entry(event.event_type()).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wage(day: usize, owner: &str) -> ControlEvent {
        ControlEvent::WageChanged {
            day,
            owner: owner.to_string(),
            old_wage: 10,
            new_wage: 12,
            workers: 1,
            worker_target: 2,
        }
    }

    #[test]
    fn test_event_day_and_owner() {
        let event = ControlEvent::InventoryRated {
            day: 42,
            owner: "buyer".to_string(),
            stock: 7,
            stock_target: 8.0,
            level: InventoryLevel::Barely,
        };
        assert_eq!(event.day(), 42);
        assert_eq!(event.owner(), "buyer");
        assert_eq!(event.event_type(), "InventoryRated");
    }

    #[test]
    fn test_event_log_queries() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.log(wage(1, "plant"));
        log.log(ControlEvent::TargetChanged {
            day: 1,
            owner: "plant".to_string(),
            old_target: 1,
            new_target: 2,
            profits: 30.0,
        });
        log.log(wage(2, "other"));

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_on_day(1).len(), 2);
        assert_eq!(log.events_of_type("WageChanged").len(), 2);
        assert_eq!(log.events_for_owner("plant").len(), 2);
        assert_eq!(
            log.counts_by_type(),
            vec![("TargetChanged", 1), ("WageChanged", 2)]
        );

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_serializes_with_event_tag() {
        let json = serde_json::to_value(ControlEvent::TurnedOff {
            day: 3,
            owner: "plant".to_string(),
        })
        .unwrap();
        assert_eq!(json["event"], "turned_off");
        assert_eq!(json["day"], 3);
    }
}
