use thiserror::Error;

/// Custom error type for the Ember framework.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum EmberError {
    #[error("Module index out of range: index {index} for {len} modules")]
    ModuleIndexOutOfRange { index: usize, len: usize },

    #[error("Parameter index out of range: position {index} for {len} parameters")]
    ParamIndexOutOfRange { index: usize, len: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A shared child whose lock was poisoned by a panicking holder.
    #[error("Module at index {index} is in an invalid state")]
    InvalidModuleState { index: usize },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("State dict mismatch: expected {expected} parameters, got {actual}")]
    StateDictMismatch { expected: usize, actual: usize },

    #[error("Gradient reduction failed: {0}")]
    ReductionFailed(String),
}
