//! Python bindings for the intent engine using PyO3

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::IntentConfig;
use crate::engine::{IntentEngine, SharedEngine};
use crate::normalize::normalize;
use crate::types::ExtractionResult;

fn to_py_err(err: crate::error::Error) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Normalize text the way the classifier sees it (Python function)
#[pyfunction]
pub fn py_normalize_text(text: &str) -> String {
    normalize(text).as_str().to_string()
}

/// Python wrapper for the intent engine
#[pyclass(name = "IntentEngine")]
pub struct PyIntentEngine {
    engine: SharedEngine,
}

#[pymethods]
impl PyIntentEngine {
    /// Build from a JSON config file, or the built-in config when no path is given
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<String>) -> PyResult<Self> {
        let engine = match config_path {
            Some(path) => IntentEngine::from_path(path),
            None => IntentEngine::with_default_config(),
        }
        .map_err(to_py_err)?;
        Ok(Self {
            engine: SharedEngine::new(engine),
        })
    }

    /// Build from a JSON config string
    #[staticmethod]
    fn from_json(config: &str) -> PyResult<Self> {
        let config = IntentConfig::from_json_str(config).map_err(to_py_err)?;
        let engine = IntentEngine::new(config).map_err(to_py_err)?;
        Ok(Self {
            engine: SharedEngine::new(engine),
        })
    }

    /// Extract intent, variables and follow-up questions from text
    fn extract<'py>(&self, text: &str, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let result = self.engine.snapshot().extract_intent(text);
        result_to_dict(py, &result)
    }

    /// Classify only; returns (intent, confidence)
    fn classify(&self, text: &str) -> (String, f64) {
        let classification = self.engine.snapshot().classify(text);
        (classification.intent, classification.confidence)
    }

    /// Swap in a new config file; the old config stays active on error
    fn reload(&self, config_path: &str) -> PyResult<()> {
        self.engine.reload_from_path(config_path).map_err(to_py_err)
    }

    /// Configured domain name
    fn domain(&self) -> String {
        self.engine.snapshot().config().domain.clone()
    }
}

fn result_to_dict<'py>(py: Python<'py>, result: &ExtractionResult) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("task", &result.task)?;

    let vars = PyDict::new_bound(py);
    for (name, value) in &result.vars {
        vars.set_item(name, value)?;
    }
    dict.set_item("vars", vars)?;

    dict.set_item("confidence", result.confidence)?;
    dict.set_item("missing", result.missing.clone())?;
    dict.set_item("follow_up", result.follow_up.clone())?;
    dict.set_item("is_complete", result.is_complete)?;
    Ok(dict)
}
