//! Intent core - offline, configuration-driven intent extraction
//!
//! Compiles a declarative intent/entity configuration into matchers, scores
//! candidate intents against normalized input, extracts entity values from
//! the original text, and reports which required fields are still missing.

pub mod error;
pub mod types;
pub mod config;
pub mod normalize;
pub mod compiler;
pub mod similarity;
pub mod matcher;
pub mod entities;
pub mod completion;
pub mod engine;

pub use error::*;
pub use types::*;
pub use config::*;
pub use normalize::*;
pub use compiler::*;
pub use similarity::*;
pub use matcher::*;
pub use entities::*;
pub use completion::*;
pub use engine::*;

// Python bindings
#[cfg(feature = "extension-module")]
pub mod py;

#[cfg(feature = "extension-module")]
use pyo3::prelude::*;

#[cfg(feature = "extension-module")]
#[pymodule]
fn intent_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use py::*;
    m.add_class::<PyIntentEngine>()?;
    m.add_function(wrap_pyfunction!(py_normalize_text, m)?)?;
    Ok(())
}
