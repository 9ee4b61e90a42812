use crate::{ScalarKind, TensorError};
use half::f16;

/// Rust types whose in-memory layout matches a [`ScalarKind`].
///
/// `bool` is deliberately absent: not every byte pattern is a valid `bool`, so boolean
/// tensors are read through [`TensorView::to_bools`](crate::TensorView::to_bools).
pub trait Element: bytemuck::Pod + Send + Sync + 'static {
    const KIND: ScalarKind;
}

macro_rules! impl_element {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;
            }
        )*
    };
}

impl_element!(
    u8 => UInt8,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f16 => Float16,
    f32 => Float32,
    f64 => Float64,
);

/// A single host scalar written into a tensor with
/// [`TensorView::set_element`](crate::TensorView::set_element).
#[derive(Debug, Clone, Copy, PartialEq, derive_more::From, derive_more::Display)]
pub enum Scalar {
    Number(f64),
    Bool(bool),
}

impl Scalar {
    /// Encodes the scalar at the native width of `kind`.
    ///
    /// Numbers are cast to the element type; boolean tensors only accept booleans and
    /// numeric tensors only accept numbers.
    pub(crate) fn encode(self, kind: ScalarKind, dst: &mut [u8]) -> Result<(), TensorError> {
        debug_assert_eq!(dst.len(), kind.width());
        match (self, kind) {
            (Scalar::Bool(value), ScalarKind::Bool) => dst[0] = value as u8,
            (Scalar::Number(value), ScalarKind::UInt8) => {
                dst.copy_from_slice(&(value as u8).to_ne_bytes())
            }
            (Scalar::Number(value), ScalarKind::Int8) => {
                dst.copy_from_slice(&(value as i8).to_ne_bytes())
            }
            (Scalar::Number(value), ScalarKind::Int16) => {
                dst.copy_from_slice(&(value as i16).to_ne_bytes())
            }
            (Scalar::Number(value), ScalarKind::Int32) => {
                dst.copy_from_slice(&(value as i32).to_ne_bytes())
            }
            (Scalar::Number(value), ScalarKind::Int64) => {
                dst.copy_from_slice(&(value as i64).to_ne_bytes())
            }
            (Scalar::Number(value), ScalarKind::Float16) => {
                dst.copy_from_slice(&f16::from_f64(value).to_ne_bytes())
            }
            (Scalar::Number(value), ScalarKind::Float32) => {
                dst.copy_from_slice(&(value as f32).to_ne_bytes())
            }
            (Scalar::Number(value), ScalarKind::Float64) => {
                dst.copy_from_slice(&value.to_ne_bytes())
            }
            (Scalar::Number(_), ScalarKind::Bool) => {
                return Err(TensorError::InvalidArgument(
                    "bool tensors expect a boolean value".to_string(),
                ));
            }
            (Scalar::Bool(_), kind) => {
                return Err(TensorError::InvalidArgument(format!(
                    "{kind} tensors expect a numeric value"
                )));
            }
        }
        Ok(())
    }
}
