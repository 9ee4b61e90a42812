#![warn(missing_docs)]

//! # modelbridge

/// Tensor views
#[cfg(feature = "tensor")]
pub use modelbridge_tensor as tensor;

/// Host bridge runtime
#[cfg(feature = "runtime")]
pub use modelbridge_runtime::*;
