use modelbridge_tensor::TensorError;
use thiserror::Error;

/// Errors surfaced to the host, either synchronously or by rejecting a promise.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Tensor(#[from] TensorError),
    #[error("Unsupported value type: {0}")]
    UnsupportedValueType(String),
    #[error("{0} has been disposed")]
    Disposed(&'static str),
    #[error("Method '{0}' not found")]
    MethodNotFound(String),
    #[error("Failed to load module from '{path}': {reason}")]
    ModuleLoadFailed { path: String, reason: String },
    #[error("Failed to load method '{method}': {reason}")]
    MethodLoadFailed { method: String, reason: String },
    #[error("Failed to execute method '{method}': {reason}")]
    MethodExecutionFailed { method: String, reason: String },
    #[error("Background task '{task}' panicked: {message}")]
    TaskPanicked { task: String, message: String },
    #[error("Task pipeline closed")]
    PipelineClosed,
}

pub type BridgeResult<T> = Result<T, BridgeError>;
