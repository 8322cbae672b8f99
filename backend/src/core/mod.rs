//! Core simulation primitives: the day/phase clock.

pub mod time;

pub use time::{Phase, Priority, SimTime};
