//! Error types for simulation runs.

use thiserror::Error;

use crate::types::{ComponentId, SignalName, Tick};

/// A fault raised inside a model's transition function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("model read input '{signal}' which was not supplied")]
    MissingInput { signal: SignalName },

    #[error("model produced {actual} output values, expected {expected}")]
    OutputArity { expected: usize, actual: usize },

    #[error("model panicked: {0}")]
    Panicked(String),
}

/// Result type for a single model tick.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors reported at the kernel boundary.
///
/// None of these are fatal to a batch: each one describes why a single run
/// was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("no model for component '{0}'")]
    UnknownComponent(ComponentId),

    #[error("{component}: signal '{signal}' has {actual} ticks, expected {expected}")]
    LengthMismatch {
        component: ComponentId,
        signal: SignalName,
        expected: usize,
        actual: usize,
    },

    #[error("{component}: declared input '{signal}' is missing")]
    MissingInput {
        component: ComponentId,
        signal: SignalName,
    },

    #[error("{component}: fault at tick {tick}: {source}")]
    ModelFault {
        component: ComponentId,
        tick: Tick,
        #[source]
        source: ModelError,
    },
}

impl SimError {
    /// Short machine-friendly label, used as a key in batch statistics.
    pub fn kind(&self) -> &'static str {
        match self {
            SimError::UnknownComponent(_) => "unknown_component",
            SimError::LengthMismatch { .. } => "length_mismatch",
            SimError::MissingInput { .. } => "missing_input",
            SimError::ModelFault { .. } => "model_fault",
        }
    }
}

/// Result type for kernel operations.
pub type SimResult<T> = Result<T, SimError>;
