use super::TensorView;
use crate::shape::{element_count, normalize_index};
use crate::{TensorError, TensorResult};

/// Selection along one axis. Negative positions count from the end of the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliceSpec {
    /// Keep the whole axis.
    #[default]
    Full,
    /// Keep a single position. The axis is retained with extent 1.
    Index(i64),
    /// Keep the half-open range `[start, end)`; missing bounds default to the axis ends.
    Range { start: Option<i64>, end: Option<i64> },
}

impl SliceSpec {
    pub fn range(start: i64, end: i64) -> Self {
        Self::Range {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn range_from(start: i64) -> Self {
        Self::Range {
            start: Some(start),
            end: None,
        }
    }

    pub fn range_to(end: i64) -> Self {
        Self::Range {
            start: None,
            end: Some(end),
        }
    }

    /// Resolves to a half-open `[start, end)` on an axis of `extent` elements.
    fn bounds(self, axis: usize, extent: usize) -> TensorResult<(usize, usize)> {
        match self {
            SliceSpec::Full => Ok((0, extent)),
            SliceSpec::Index(index) => {
                let start = normalize_index(axis, index, extent)?;
                if start == extent {
                    return Err(TensorError::IndexOutOfRange {
                        axis,
                        index,
                        extent,
                    });
                }
                Ok((start, start + 1))
            }
            SliceSpec::Range { start, end } => {
                let lo = match start {
                    Some(index) => normalize_index(axis, index, extent)?,
                    None => 0,
                };
                let hi = match end {
                    Some(index) => normalize_index(axis, index, extent)?,
                    None => extent,
                };
                if lo > hi {
                    return Err(TensorError::IndexOutOfRange {
                        axis,
                        index: start.unwrap_or_default(),
                        extent,
                    });
                }
                Ok((lo, hi))
            }
        }
    }
}

impl TensorView {
    /// Copies a rectangular sub-region into a new view.
    ///
    /// Axes past the end of `specs` are kept whole. The result has the same rank and kind
    /// as `self` and never shares memory with it.
    pub fn slice(&self, specs: &[SliceSpec]) -> TensorResult<TensorView> {
        let buffer = self.buffer()?;
        let rank = self.rank();
        if specs.len() > rank {
            return Err(TensorError::InvalidArgument(format!(
                "{} slice specs for a tensor of rank {rank}",
                specs.len()
            )));
        }

        let mut starts = Vec::with_capacity(rank);
        let mut shape = Vec::with_capacity(rank);
        for (axis, &extent) in self.shape.iter().enumerate() {
            let spec = specs.get(axis).copied().unwrap_or_default();
            let (start, end) = spec.bounds(axis, extent)?;
            starts.push(start);
            shape.push(end - start);
        }

        let width = self.kind.width();
        let count = element_count(&shape);
        let src = buffer.read();
        let mut out = Vec::with_capacity(count * width);

        if rank == 0 {
            out.extend_from_slice(&src);
        } else if count > 0 {
            // Copy one contiguous run along the innermost axis per outer coordinate.
            let inner = rank - 1;
            let run = shape[inner] * width;
            let outer_shape = &shape[..inner];
            let mut coord = vec![0usize; inner];
            for _ in 0..element_count(outer_shape) {
                let offset = starts[inner]
                    + (0..inner)
                        .map(|axis| (starts[axis] + coord[axis]) * self.strides[axis])
                        .sum::<usize>();
                let byte = offset * width;
                out.extend_from_slice(&src[byte..byte + run]);

                for axis in (0..inner).rev() {
                    coord[axis] += 1;
                    if coord[axis] < outer_shape[axis] {
                        break;
                    }
                    coord[axis] = 0;
                }
            }
        }
        drop(src);

        TensorView::from_owned(self.kind, shape, out)
    }
}
