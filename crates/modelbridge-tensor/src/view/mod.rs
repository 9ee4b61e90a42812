mod concat;
mod slice;

#[cfg(test)]
mod tests;

pub use slice::SliceSpec;

use crate::buffer::{BufferLease, Ownership, TensorBuffer, TensorBytes};
use crate::shape::{
    checked_byte_size, checked_element_count, checked_shape, contiguous_strides, element_count,
    flat_offset,
};
use crate::{Element, Scalar, ScalarKind, TensorError, TensorResult};

/// An N-dimensional row-major array over a byte buffer it owns exclusively.
///
/// Metadata accessors ([`kind`](Self::kind), [`shape`](Self::shape), ...) stay available
/// after [`dispose`](Self::dispose); everything that touches the buffer fails with
/// [`TensorError::Disposed`].
pub struct TensorView {
    kind: ScalarKind,
    shape: Vec<usize>,
    strides: Vec<usize>,
    buffer: Option<TensorBuffer>,
}

impl TensorView {
    /// Builds a view from host-supplied extents and bytes. The bytes are deep-copied.
    pub fn new(kind: ScalarKind, shape: &[i64], bytes: &[u8]) -> TensorResult<Self> {
        let shape = checked_shape(shape)?;
        check_size(kind, &shape, bytes.len())?;
        Ok(Self::with_buffer(kind, shape, TensorBuffer::copied_from(bytes)))
    }

    /// Typed convenience constructor.
    pub fn from_elements<T: Element>(shape: &[usize], data: &[T]) -> TensorResult<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        check_size(T::KIND, shape, bytes.len())?;
        Ok(Self::with_buffer(
            T::KIND,
            shape.to_vec(),
            TensorBuffer::copied_from(bytes),
        ))
    }

    pub fn from_bools(shape: &[usize], data: &[bool]) -> TensorResult<Self> {
        let bytes: Vec<u8> = data.iter().map(|&b| b as u8).collect();
        check_size(ScalarKind::Bool, shape, bytes.len())?;
        Ok(Self::with_buffer(
            ScalarKind::Bool,
            shape.to_vec(),
            TensorBuffer::owned(bytes),
        ))
    }

    /// Takes ownership of a buffer produced by the engine. No copy is made.
    pub fn from_engine(kind: ScalarKind, shape: Vec<usize>, bytes: Vec<u8>) -> TensorResult<Self> {
        check_size(kind, &shape, bytes.len())?;
        Ok(Self::with_buffer(kind, shape, TensorBuffer::adopted(bytes)))
    }

    pub(crate) fn from_owned(
        kind: ScalarKind,
        shape: Vec<usize>,
        bytes: Vec<u8>,
    ) -> TensorResult<Self> {
        check_size(kind, &shape, bytes.len())?;
        Ok(Self::with_buffer(kind, shape, TensorBuffer::owned(bytes)))
    }

    fn with_buffer(kind: ScalarKind, shape: Vec<usize>, buffer: TensorBuffer) -> Self {
        let strides = contiguous_strides(&shape);
        Self {
            kind,
            shape,
            strides,
            buffer: Some(buffer),
        }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Canonical dtype name, e.g. `"float32"`.
    pub fn dtype(&self) -> &'static str {
        self.kind.name()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Row-major strides in elements.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn element_count(&self) -> usize {
        element_count(&self.shape)
    }

    pub fn byte_size(&self) -> usize {
        self.element_count() * self.kind.width()
    }

    pub fn is_disposed(&self) -> bool {
        self.buffer.is_none()
    }

    pub fn ownership(&self) -> TensorResult<Ownership> {
        Ok(self.buffer()?.ownership())
    }

    pub(crate) fn buffer(&self) -> TensorResult<&TensorBuffer> {
        self.buffer.as_ref().ok_or(TensorError::Disposed)
    }

    fn buffer_mut(&mut self) -> TensorResult<&mut TensorBuffer> {
        self.buffer.as_mut().ok_or(TensorError::Disposed)
    }

    /// Read-only view of the raw bytes.
    pub fn read_raw(&self) -> TensorResult<TensorBytes<'_>> {
        Ok(self.buffer()?.read())
    }

    /// Reinterprets the bytes as `T`. `T` must be the view's own element type.
    pub fn to_vec<T: Element>(&self) -> TensorResult<Vec<T>> {
        let bytes = self.read_raw()?;
        if T::KIND != self.kind {
            return Err(TensorError::DtypeMismatch {
                expected: self.kind,
                actual: T::KIND,
            });
        }
        Ok(bytemuck::pod_collect_to_vec(&bytes))
    }

    pub fn to_bools(&self) -> TensorResult<Vec<bool>> {
        let bytes = self.read_raw()?;
        if self.kind != ScalarKind::Bool {
            return Err(TensorError::DtypeMismatch {
                expected: self.kind,
                actual: ScalarKind::Bool,
            });
        }
        Ok(bytes.iter().map(|&b| b != 0).collect())
    }

    /// Overwrites the whole buffer. Outstanding leases keep the previous bytes.
    pub fn write_raw(&mut self, bytes: &[u8]) -> TensorResult<()> {
        let buffer = self.buffer_mut()?;
        if bytes.len() != buffer.len() {
            return Err(TensorError::SizeMismatch {
                expected: buffer.len(),
                actual: bytes.len(),
            });
        }
        buffer.make_mut().copy_from_slice(bytes);
        Ok(())
    }

    /// Writes one element at `index`, encoded at the view's native width.
    pub fn set_element(&mut self, index: &[i64], value: impl Into<Scalar>) -> TensorResult<()> {
        self.buffer()?;
        if index.len() != self.rank() {
            return Err(TensorError::InvalidArgument(format!(
                "index has {} components but tensor has rank {}",
                index.len(),
                self.rank()
            )));
        }
        let position = index
            .iter()
            .zip(&self.shape)
            .enumerate()
            .map(|(axis, (&i, &extent))| match usize::try_from(i) {
                Ok(i) if i < extent => Ok(i),
                _ => Err(TensorError::IndexOutOfRange {
                    axis,
                    index: i,
                    extent,
                }),
            })
            .collect::<TensorResult<Vec<_>>>()?;

        let kind = self.kind;
        let width = kind.width();
        let start = flat_offset(&position, &self.strides) * width;
        let bytes = self.buffer_mut()?.make_mut();
        value.into().encode(kind, &mut bytes[start..start + width])
    }

    /// Replaces the shape in place. The bytes are untouched.
    pub fn reshape(&mut self, new_shape: &[i64]) -> TensorResult<()> {
        self.buffer()?;
        let new_shape = checked_shape(new_shape)?;
        let expected = self.element_count();
        let actual = checked_element_count(&new_shape)?;
        if expected != actual {
            return Err(TensorError::ElementCountMismatch { expected, actual });
        }
        self.strides = contiguous_strides(&new_shape);
        self.shape = new_shape;
        Ok(())
    }

    /// Read-only lease of the buffer for the engine. The lease keeps the bytes alive even
    /// if the view is disposed while the engine still reads them.
    pub fn lease(&self) -> TensorResult<BufferLease> {
        Ok(self.buffer()?.lease())
    }

    /// Releases the buffer. Calling it again is a no-op.
    pub fn dispose(&mut self) {
        self.buffer = None;
    }
}

impl std::fmt::Debug for TensorView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorView")
            .field("kind", &self.kind)
            .field("shape", &self.shape)
            .field("ownership", &self.buffer.as_ref().map(TensorBuffer::ownership))
            .finish()
    }
}

fn check_size(kind: ScalarKind, shape: &[usize], actual: usize) -> TensorResult<()> {
    let expected = checked_byte_size(kind, shape)?;
    if expected != actual {
        return Err(TensorError::SizeMismatch { expected, actual });
    }
    Ok(())
}
