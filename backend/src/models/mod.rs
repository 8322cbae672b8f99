//! Records produced while a scenario runs

pub mod event;

pub use event::{ControlEvent, EventLog};
