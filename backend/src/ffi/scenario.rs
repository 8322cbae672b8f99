//! PyO3 wrappers for the reference scenarios
//!
//! Python drives parameter sweeps: build a scenario from a dict, run it,
//! read back the summary, trajectory and event log as plain Python data.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{parse_config, scenario_error_to_py, to_py};
use crate::scenario::{
    find_worker_target_that_maximizes_profits, BuyerConfig, BuyerScenario, MonopolistConfig,
    MonopolistScenario,
};
use crate::workforce::AlgorithmRegistry;

/// Python wrapper for [`MonopolistScenario`]
///
/// # Example (from Python)
///
/// ```python
/// from firm_control_core_rs import MonopolistScenario
///
/// scenario = MonopolistScenario.new({"seed": 7, "days": 2000})
/// summary = scenario.run()
/// print(summary["final_workers"], summary["optimal_workers"])
/// ```
#[pyclass(name = "MonopolistScenario")]
pub struct PyMonopolistScenario {
    inner: MonopolistScenario,
}

#[pymethods]
impl PyMonopolistScenario {
    /// Create a scenario from a config dict (defaults for missing fields)
    ///
    /// # Errors
    ///
    /// Raises ValueError for invalid configs or unknown algorithm names.
    #[staticmethod]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let config: MonopolistConfig = parse_config(config)?;
        let registry = AlgorithmRegistry::with_builtin_algorithms();
        let inner = MonopolistScenario::new(config, &registry).map_err(scenario_error_to_py)?;
        Ok(PyMonopolistScenario { inner })
    }

    /// Run every event up to and including `last_day`; returns events fired
    fn run_until(&mut self, last_day: usize) -> PyResult<usize> {
        self.inner.run_until(last_day).map_err(scenario_error_to_py)
    }

    /// Run the configured number of days; returns the summary dict
    fn run(&mut self, py: Python<'_>) -> PyResult<PyObject> {
        let summary = self.inner.run().map_err(scenario_error_to_py)?;
        to_py(py, &summary)
    }

    fn summary(&self, py: Python<'_>) -> PyResult<PyObject> {
        let summary = self.inner.summary().map_err(scenario_error_to_py)?;
        to_py(py, &summary)
    }

    /// One dict per production day
    fn trajectory(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.inner.trajectory())
    }

    /// One dict per control event, tagged by `event`
    fn events(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.inner.event_log().events())
    }

    fn current_day(&self) -> usize {
        self.inner.current_day()
    }

    fn wage(&self) -> i64 {
        self.inner.wage()
    }

    fn workers(&self) -> u32 {
        self.inner.workers()
    }

    fn algorithm(&self) -> String {
        self.inner.algorithm_name().to_string()
    }
}

/// Python wrapper for [`BuyerScenario`]
#[pyclass(name = "BuyerScenario")]
pub struct PyBuyerScenario {
    inner: BuyerScenario,
}

#[pymethods]
impl PyBuyerScenario {
    #[staticmethod]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let config: BuyerConfig = parse_config(config)?;
        let inner = BuyerScenario::new(config).map_err(scenario_error_to_py)?;
        Ok(PyBuyerScenario { inner })
    }

    fn run_until(&mut self, last_day: usize) -> PyResult<usize> {
        self.inner.run_until(last_day).map_err(scenario_error_to_py)
    }

    fn run(&mut self, py: Python<'_>) -> PyResult<PyObject> {
        let summary = self.inner.run().map_err(scenario_error_to_py)?;
        to_py(py, &summary)
    }

    fn summary(&self, py: Python<'_>) -> PyResult<PyObject> {
        let summary = self.inner.summary().map_err(scenario_error_to_py)?;
        to_py(py, &summary)
    }

    fn trajectory(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.inner.trajectory())
    }

    fn events(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.inner.event_log().events())
    }

    /// Stop buying for good
    fn turn_off(&mut self) -> PyResult<()> {
        self.inner.turn_off().map_err(scenario_error_to_py)
    }

    fn price(&self) -> i64 {
        self.inner.price()
    }

    fn stock(&self) -> u64 {
        self.inner.stock()
    }
}

/// Profit-maximizing workforce of the linear monopolist market
#[pyfunction]
pub fn optimal_worker_target(
    demand_intercept: f64,
    demand_slope: f64,
    wage_intercept: f64,
    wage_slope: f64,
    productivity: f64,
) -> u32 {
    find_worker_target_that_maximizes_profits(
        demand_intercept,
        demand_slope,
        wage_intercept,
        wage_slope,
        productivity,
    )
}
