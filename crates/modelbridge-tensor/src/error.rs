use crate::ScalarKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TensorError {
    #[error("Unknown dtype '{0}'")]
    UnknownDtype(String),
    #[error("Invalid shape: {0}")]
    InvalidShape(String),
    #[error("Data length does not match shape: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("Tensors have different sizes on axis {axis}: expected {expected}, got {actual}")]
    ShapeMismatch {
        axis: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Tensors have different ranks: expected {expected}, got {actual}")]
    RankMismatch { expected: usize, actual: usize },
    #[error("Tensors have different dtypes: expected {expected}, got {actual}")]
    DtypeMismatch {
        expected: ScalarKind,
        actual: ScalarKind,
    },
    #[error("Invalid axis {axis} for tensor of rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },
    #[error("Index {index} out of range for axis {axis} with extent {extent}")]
    IndexOutOfRange {
        axis: usize,
        index: i64,
        extent: usize,
    },
    #[error("New shape must have the same number of elements: expected {expected}, got {actual}")]
    ElementCountMismatch { expected: usize, actual: usize },
    #[error("Expected non-empty array of tensors")]
    EmptyInput,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Tensor has been disposed")]
    Disposed,
}
