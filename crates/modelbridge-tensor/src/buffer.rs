use std::ops::Deref;
use std::sync::Arc;

/// Where a view's bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Ownership {
    /// Deep copy of caller-supplied bytes, or a fresh slice/concat result.
    Owned,
    /// Buffer produced by the engine whose ownership moved into the view.
    EngineTransferred,
}

/// Byte storage exclusively owned by one [`TensorView`](crate::TensorView).
///
/// The only way to share it is a read-only [`BufferLease`]. Writing while a lease is
/// outstanding copies the bytes first, so the lease keeps the snapshot it was taken from.
#[derive(Debug)]
pub(crate) struct TensorBuffer {
    bytes: Arc<Vec<u8>>,
    ownership: Ownership,
}

impl TensorBuffer {
    pub(crate) fn copied_from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec(), Ownership::Owned)
    }

    pub(crate) fn owned(bytes: Vec<u8>) -> Self {
        Self::new(bytes, Ownership::Owned)
    }

    pub(crate) fn adopted(bytes: Vec<u8>) -> Self {
        Self::new(bytes, Ownership::EngineTransferred)
    }

    fn new(bytes: Vec<u8>, ownership: Ownership) -> Self {
        Self {
            bytes: Arc::new(bytes),
            ownership,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub(crate) fn read(&self) -> TensorBytes<'_> {
        TensorBytes(&self.bytes)
    }

    /// Mutable access to the bytes, detaching from any outstanding lease.
    pub(crate) fn make_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.bytes).as_mut_slice()
    }

    pub(crate) fn lease(&self) -> BufferLease {
        BufferLease {
            bytes: self.bytes.clone(),
        }
    }
}

/// Read-only handle on a view's buffer, handed to the engine for the duration of a call.
///
/// A lease is an immutable snapshot: later writes through the owning view never show up
/// in it and never wait for it.
#[derive(Debug, Clone)]
pub struct BufferLease {
    bytes: Arc<Vec<u8>>,
}

impl BufferLease {
    pub fn read(&self) -> TensorBytes<'_> {
        TensorBytes(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

/// Borrowed view of tensor bytes.
pub struct TensorBytes<'a>(&'a [u8]);

impl Deref for TensorBytes<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.0
    }
}

impl AsRef<[u8]> for TensorBytes<'_> {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl std::fmt::Debug for TensorBytes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TensorBytes").field(&self.len()).finish()
    }
}
