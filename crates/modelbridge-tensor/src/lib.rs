//! Tensor memory and view model.
//!
//! A [`TensorView`] is an N-dimensional, row-major array over a byte buffer that it owns
//! exclusively. Views are built from caller bytes (always deep-copied), from the result of
//! [`TensorView::slice`] / [`TensorView::concat`] (always freshly allocated), or by adopting
//! a buffer produced by the inference engine. The element type is one of the closed set of
//! [`ScalarKind`]s.
//!
//! ```
//! use modelbridge_tensor::{ScalarKind, SliceSpec, TensorView};
//!
//! let t = TensorView::from_elements(&[2, 3], &[1f32, 2., 3., 4., 5., 6.]).unwrap();
//! let row = t.slice(&[SliceSpec::range(0, 1), SliceSpec::Full]).unwrap();
//! assert_eq!(row.shape(), &[1, 3]);
//! assert_eq!(row.kind(), ScalarKind::Float32);
//! assert_eq!(row.to_vec::<f32>().unwrap(), vec![1., 2., 3.]);
//! ```
mod buffer;
mod dtype;
mod element;
mod error;
mod shape;
mod view;

pub use buffer::{BufferLease, Ownership, TensorBytes};
pub use dtype::{ScalarKind, kind_of, name_of, width_of};
pub use element::{Element, Scalar};
pub use error::TensorError;
pub use shape::{contiguous_strides, element_count};
pub use view::{SliceSpec, TensorView};

pub type TensorResult<T> = Result<T, TensorError>;
