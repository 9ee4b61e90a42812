use super::TensorView;
use crate::shape::{checked_byte_size, element_count};
use crate::{TensorError, TensorResult};

impl TensorView {
    /// Joins views along `axis` into a new view.
    ///
    /// Every input must share the first input's kind and rank, and agree with it on every
    /// axis except `axis`.
    pub fn concat(views: &[&TensorView], axis: usize) -> TensorResult<TensorView> {
        let first = views.first().ok_or(TensorError::EmptyInput)?;
        let (kind, rank) = (first.kind, first.rank());

        for view in views {
            view.buffer()?;
            if view.kind != kind {
                return Err(TensorError::DtypeMismatch {
                    expected: kind,
                    actual: view.kind,
                });
            }
            if view.rank() != rank {
                return Err(TensorError::RankMismatch {
                    expected: rank,
                    actual: view.rank(),
                });
            }
        }
        if axis >= rank {
            return Err(TensorError::InvalidAxis { axis, rank });
        }

        let mut shape = first.shape.clone();
        shape[axis] = 0;
        for view in views {
            for (dim, (&expected, &actual)) in first.shape.iter().zip(&view.shape).enumerate() {
                if dim != axis && expected != actual {
                    return Err(TensorError::ShapeMismatch {
                        axis: dim,
                        expected,
                        actual,
                    });
                }
            }
            shape[axis] = shape[axis].checked_add(view.shape[axis]).ok_or_else(|| {
                TensorError::InvalidShape(format!("axis {axis} extent overflows usize"))
            })?;
        }

        let width = kind.width();
        let outer = element_count(&first.shape[..axis]);
        let mut out = Vec::with_capacity(checked_byte_size(kind, &shape)?);
        let sources = views
            .iter()
            .map(|view| view.read_raw())
            .collect::<TensorResult<Vec<_>>>()?;
        for i in 0..outer {
            for (view, bytes) in views.iter().zip(&sources) {
                let chunk = element_count(&view.shape[axis..]) * width;
                out.extend_from_slice(&bytes[i * chunk..(i + 1) * chunk]);
            }
        }
        drop(sources);

        TensorView::from_owned(kind, shape, out)
    }
}
