//! Python bindings (feature `pyo3`)

pub mod scenario;
pub mod types;
