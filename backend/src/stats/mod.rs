//! Small statistics helpers used by the control algorithms
//!
//! - [`trend`]: least-squares line through a set of (x, y) observations

pub mod trend;

pub use trend::{LinearTrend, TrendFit};
