//! Type conversion utilities for FFI boundary
//!
//! Configs cross the boundary as plain dicts and results come back as plain
//! dicts and lists. Both directions go through `serde_json::Value`, so the
//! Python side sees exactly the field names the JSON configs use.

use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyList, PyTuple};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::scenario::ScenarioError;

/// Convert an arbitrary Python value made of dicts, lists, strings,
/// numbers, bools and None into JSON
pub fn py_to_json(value: &Bound<'_, PyAny>) -> PyResult<Value> {
    if value.is_none() {
        return Ok(Value::Null);
    }
    if let Ok(flag) = value.downcast::<PyBool>() {
        return Ok(Value::Bool(flag.is_true()));
    }
    if value.downcast::<PyFloat>().is_ok() {
        let float: f64 = value.extract()?;
        return Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| PyValueError::new_err(format!("Non-finite number {}", float)));
    }
    if let Ok(int) = value.extract::<i64>() {
        return Ok(Value::from(int));
    }
    if let Ok(text) = value.extract::<String>() {
        return Ok(Value::String(text));
    }
    if let Ok(dict) = value.downcast::<PyDict>() {
        let mut map = Map::new();
        for (key, item) in dict.iter() {
            let key: String = key
                .extract()
                .map_err(|_| PyTypeError::new_err("Config keys must be strings"))?;
            map.insert(key, py_to_json(&item)?);
        }
        return Ok(Value::Object(map));
    }
    if let Ok(list) = value.downcast::<PyList>() {
        let items = list
            .iter()
            .map(|item| py_to_json(&item))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(Value::Array(items));
    }
    if let Ok(tuple) = value.downcast::<PyTuple>() {
        let items = tuple
            .iter()
            .map(|item| py_to_json(&item))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(Value::Array(items));
    }
    Err(PyTypeError::new_err(format!(
        "Unsupported config value of type {}",
        value.get_type().name()?
    )))
}

/// Convert JSON back into Python objects
pub fn json_to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    Ok(match value {
        Value::Null => py.None(),
        Value::Bool(flag) => flag.into_py(py),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                int.into_py(py)
            } else if let Some(uint) = number.as_u64() {
                uint.into_py(py)
            } else {
                number.as_f64().unwrap_or(f64::NAN).into_py(py)
            }
        }
        Value::String(text) => text.into_py(py),
        Value::Array(items) => {
            let list = PyList::empty_bound(py);
            for item in items {
                list.append(json_to_py(py, item)?)?;
            }
            list.into_py(py)
        }
        Value::Object(map) => {
            let dict = PyDict::new_bound(py);
            for (key, item) in map {
                dict.set_item(key, json_to_py(py, item)?)?;
            }
            dict.into_py(py)
        }
    })
}

/// Build a config from an optional dict; missing fields take their defaults
pub fn parse_config<T: DeserializeOwned + Default>(
    config: Option<&Bound<'_, PyDict>>,
) -> PyResult<T> {
    let Some(config) = config else {
        return Ok(T::default());
    };
    let value = py_to_json(config.as_any())?;
    serde_json::from_value(value)
        .map_err(|e| PyValueError::new_err(format!("Invalid config: {}", e)))
}

/// Serialize any result type into Python objects
pub fn to_py<T: Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let value = serde_json::to_value(value)
        .map_err(|e| PyRuntimeError::new_err(format!("Serialization failed: {}", e)))?;
    json_to_py(py, &value)
}

/// Config problems are the caller's fault; everything else is a runtime
/// failure
pub fn scenario_error_to_py(error: ScenarioError) -> PyErr {
    match error {
        ScenarioError::Config(_) | ScenarioError::ConfigMismatch { .. } => {
            PyValueError::new_err(error.to_string())
        }
        other => PyRuntimeError::new_err(other.to_string()),
    }
}
