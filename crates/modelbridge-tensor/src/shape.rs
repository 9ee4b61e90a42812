use crate::{ScalarKind, TensorError};

/// Product of the extents. A rank-0 shape holds a single element.
pub fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Row-major (C-order) strides, in elements.
pub fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Converts host-provided extents, rejecting negative ones.
pub(crate) fn checked_shape(shape: &[i64]) -> Result<Vec<usize>, TensorError> {
    shape
        .iter()
        .enumerate()
        .map(|(axis, &extent)| {
            usize::try_from(extent).map_err(|_| {
                TensorError::InvalidShape(format!("negative extent {extent} on axis {axis}"))
            })
        })
        .collect()
}

/// Element count of `shape`, rejecting shapes whose strides or count overflow `usize`.
pub(crate) fn checked_element_count(shape: &[usize]) -> Result<usize, TensorError> {
    // Suffix products are the strides, so checking each one covers the stride table too.
    shape.iter().rev().try_fold(1usize, |acc, &extent| {
        acc.checked_mul(extent)
            .ok_or_else(|| TensorError::InvalidShape(format!("{shape:?} overflows usize")))
    })
}

/// Byte size of a `kind` tensor of `shape`.
pub(crate) fn checked_byte_size(kind: ScalarKind, shape: &[usize]) -> Result<usize, TensorError> {
    checked_element_count(shape)?
        .checked_mul(kind.width())
        .ok_or_else(|| TensorError::InvalidShape(format!("{shape:?} of {kind} overflows usize")))
}

/// Flat element offset of `index` given row-major `strides`.
pub(crate) fn flat_offset(index: &[usize], strides: &[usize]) -> usize {
    index.iter().zip(strides).map(|(i, s)| i * s).sum()
}

/// Normalizes a possibly negative index against `extent`; the result may lie anywhere in
/// `[0, extent]`, callers decide whether `extent` itself is acceptable.
pub(crate) fn normalize_index(
    axis: usize,
    index: i64,
    extent: usize,
) -> Result<usize, TensorError> {
    let out_of_range = || TensorError::IndexOutOfRange {
        axis,
        index,
        extent,
    };
    let extent_i = i64::try_from(extent).map_err(|_| out_of_range())?;
    let normalized = if index < 0 { index + extent_i } else { index };
    if (0..=extent_i).contains(&normalized) {
        Ok(normalized as usize)
    } else {
        Err(out_of_range())
    }
}
