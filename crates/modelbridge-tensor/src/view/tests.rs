use super::*;
use crate::Ownership;
use rstest::rstest;

fn iota(shape: &[usize]) -> TensorView {
    let data: Vec<f32> = (0..element_count(shape)).map(|i| i as f32).collect();
    TensorView::from_elements(shape, &data).unwrap()
}

#[test]
fn test_new_copies_caller_bytes() {
    let mut bytes = 7i32.to_ne_bytes().to_vec();
    let view = TensorView::new(ScalarKind::Int32, &[1], &bytes).unwrap();
    bytes[0] = 0;

    assert_eq!(view.to_vec::<i32>().unwrap(), vec![7]);
    assert_eq!(view.ownership().unwrap(), Ownership::Owned);
}

#[test]
fn test_new_rejects_wrong_byte_length() {
    let err = TensorView::new(ScalarKind::Float32, &[2, 2], &[0u8; 15]).unwrap_err();
    assert_eq!(
        err,
        TensorError::SizeMismatch {
            expected: 16,
            actual: 15
        }
    );
}

#[test]
fn test_new_rejects_negative_extent() {
    let err = TensorView::new(ScalarKind::UInt8, &[2, -1], &[]).unwrap_err();
    assert!(matches!(err, TensorError::InvalidShape(_)));
}

#[rstest]
#[case(&[1 << 62, 4])]
#[case(&[i64::MAX, i64::MAX])]
#[case(&[0, 1 << 40, 1 << 40])]
fn test_new_rejects_overflowing_extents(#[case] shape: &[i64]) {
    let err = TensorView::new(ScalarKind::UInt8, shape, &[]).unwrap_err();
    assert!(matches!(err, TensorError::InvalidShape(_)));
}

#[test]
fn test_byte_size_overflow_is_invalid() {
    let err = TensorView::new(ScalarKind::Float64, &[1 << 61], &[]).unwrap_err();
    assert!(matches!(err, TensorError::InvalidShape(_)));

    let err =
        TensorView::from_engine(ScalarKind::Int32, vec![usize::MAX / 2], vec![]).unwrap_err();
    assert!(matches!(err, TensorError::InvalidShape(_)));
}

#[test]
fn test_metadata_accessors() {
    let view = iota(&[2, 3, 4]);
    assert_eq!(view.dtype(), "float32");
    assert_eq!(view.rank(), 3);
    assert_eq!(view.strides(), &[12, 4, 1]);
    assert_eq!(view.element_count(), 24);
    assert_eq!(view.byte_size(), 96);
}

#[test]
fn test_scalar_and_empty_views() {
    let scalar = TensorView::from_elements::<f64>(&[], &[1.5]).unwrap();
    assert_eq!(scalar.rank(), 0);
    assert_eq!(scalar.to_vec::<f64>().unwrap(), vec![1.5]);

    let empty = TensorView::from_elements::<f32>(&[0, 3], &[]).unwrap();
    assert_eq!(empty.element_count(), 0);
    assert_eq!(empty.byte_size(), 0);
}

#[test]
fn test_engine_buffers_are_adopted() {
    let bytes = [1i64, 2].iter().flat_map(|v| v.to_ne_bytes()).collect();
    let view = TensorView::from_engine(ScalarKind::Int64, vec![2], bytes).unwrap();
    assert_eq!(view.ownership().unwrap(), Ownership::EngineTransferred);
    assert_eq!(view.to_vec::<i64>().unwrap(), vec![1, 2]);
}

#[test]
fn test_to_vec_checks_element_type() {
    let view = iota(&[2]);
    assert_eq!(
        view.to_vec::<f64>().unwrap_err(),
        TensorError::DtypeMismatch {
            expected: ScalarKind::Float32,
            actual: ScalarKind::Float64
        }
    );
}

#[test]
fn test_bool_views() {
    let view = TensorView::from_bools(&[3], &[true, false, true]).unwrap();
    assert_eq!(view.kind(), ScalarKind::Bool);
    assert_eq!(&*view.read_raw().unwrap(), &[1, 0, 1]);
    assert_eq!(view.to_bools().unwrap(), vec![true, false, true]);
}

#[test]
fn test_write_raw_replaces_contents() {
    let mut view = iota(&[2]);
    let bytes: Vec<u8> = [9f32, 8.].iter().flat_map(|v| v.to_ne_bytes()).collect();
    view.write_raw(&bytes).unwrap();
    assert_eq!(view.to_vec::<f32>().unwrap(), vec![9., 8.]);

    let err = view.write_raw(&bytes[..4]).unwrap_err();
    assert!(matches!(err, TensorError::SizeMismatch { .. }));
}

#[rstest]
#[case(ScalarKind::UInt8, 200.0)]
#[case(ScalarKind::Int8, -3.0)]
#[case(ScalarKind::Int16, 1234.0)]
#[case(ScalarKind::Int32, -70000.0)]
#[case(ScalarKind::Int64, 1e12)]
#[case(ScalarKind::Float16, 0.25)]
#[case(ScalarKind::Float32, 1.5)]
#[case(ScalarKind::Float64, 2.75)]
fn test_set_element_encodes_native_width(#[case] kind: ScalarKind, #[case] value: f64) {
    let zeros = vec![0u8; 4 * kind.width()];
    let mut view = TensorView::new(kind, &[2, 2], &zeros).unwrap();
    view.set_element(&[1, 0], value).unwrap();

    let mut expected = vec![0u8; kind.width()];
    Scalar::Number(value).encode(kind, &mut expected).unwrap();

    let bytes = view.read_raw().unwrap();
    let start = 2 * kind.width();
    assert_eq!(&bytes[start..start + kind.width()], expected.as_slice());
    assert!(bytes[..start].iter().all(|&b| b == 0));
    assert!(bytes[start + kind.width()..].iter().all(|&b| b == 0));
}

#[test]
fn test_set_element_bool() {
    let mut view = TensorView::from_bools(&[2], &[false, false]).unwrap();
    view.set_element(&[1], true).unwrap();
    assert_eq!(view.to_bools().unwrap(), vec![false, true]);
}

#[test]
fn test_set_element_validates_index() {
    let mut view = iota(&[2, 3]);
    assert!(matches!(
        view.set_element(&[0], 1.0),
        Err(TensorError::InvalidArgument(_))
    ));
    assert_eq!(
        view.set_element(&[1, 3], 1.0).unwrap_err(),
        TensorError::IndexOutOfRange {
            axis: 1,
            index: 3,
            extent: 3
        }
    );
    assert!(matches!(
        view.set_element(&[-1, 0], 1.0),
        Err(TensorError::IndexOutOfRange { axis: 0, .. })
    ));
}

#[test]
fn test_reshape_keeps_bytes() {
    let mut view = iota(&[2, 3]);
    let before = view.to_vec::<f32>().unwrap();
    view.reshape(&[3, 2]).unwrap();
    assert_eq!(view.shape(), &[3, 2]);
    assert_eq!(view.strides(), &[2, 1]);
    assert_eq!(view.to_vec::<f32>().unwrap(), before);

    assert_eq!(
        view.reshape(&[4, 2]).unwrap_err(),
        TensorError::ElementCountMismatch {
            expected: 6,
            actual: 8
        }
    );
    assert_eq!(view.shape(), &[3, 2]);
}

#[test]
fn test_reshape_rejects_overflowing_extents() {
    let mut view = TensorView::from_elements::<u8>(&[0, 4], &[]).unwrap();
    for shape in [&[0, 1 << 62, 4][..], &[0, i64::MAX, 4]] {
        assert!(matches!(
            view.reshape(shape),
            Err(TensorError::InvalidShape(_))
        ));
    }
    assert_eq!(view.shape(), &[0, 4]);

    view.reshape(&[4, 0, 1 << 40]).unwrap();
    assert_eq!(view.element_count(), 0);
}

#[test]
fn test_slice_rows_and_columns() {
    let view = iota(&[3, 4]);

    let rows = view.slice(&[SliceSpec::range(1, 3)]).unwrap();
    assert_eq!(rows.shape(), &[2, 4]);
    assert_eq!(
        rows.to_vec::<f32>().unwrap(),
        vec![4., 5., 6., 7., 8., 9., 10., 11.]
    );

    let cols = view
        .slice(&[SliceSpec::Full, SliceSpec::range(1, 3)])
        .unwrap();
    assert_eq!(cols.shape(), &[3, 2]);
    assert_eq!(cols.to_vec::<f32>().unwrap(), vec![1., 2., 5., 6., 9., 10.]);
}

#[test]
fn test_slice_index_keeps_axis() {
    let view = iota(&[3, 4]);
    let row = view.slice(&[SliceSpec::Index(-1)]).unwrap();
    assert_eq!(row.shape(), &[1, 4]);
    assert_eq!(row.to_vec::<f32>().unwrap(), vec![8., 9., 10., 11.]);
}

#[test]
fn test_slice_negative_and_open_bounds() {
    let view = iota(&[6]);
    let tail = view.slice(&[SliceSpec::range_from(-2)]).unwrap();
    assert_eq!(tail.to_vec::<f32>().unwrap(), vec![4., 5.]);

    let head = view.slice(&[SliceSpec::range_to(-4)]).unwrap();
    assert_eq!(head.to_vec::<f32>().unwrap(), vec![0., 1.]);

    let empty = view.slice(&[SliceSpec::range(3, 3)]).unwrap();
    assert_eq!(empty.shape(), &[0]);
}

#[test]
fn test_slice_3d_matches_manual_indexing() {
    let view = iota(&[2, 3, 4]);
    let sub = view
        .slice(&[
            SliceSpec::Index(1),
            SliceSpec::range(0, 2),
            SliceSpec::range(1, 4),
        ])
        .unwrap();
    assert_eq!(sub.shape(), &[1, 2, 3]);

    let expected: Vec<f32> = (0..2)
        .flat_map(|j| (1..4).map(move |k| (12 + j * 4 + k) as f32))
        .collect();
    assert_eq!(sub.to_vec::<f32>().unwrap(), expected);
}

#[test]
fn test_slice_is_independent_copy() {
    let mut view = iota(&[2, 2]);
    let copy = view.slice(&[]).unwrap();
    view.set_element(&[0, 0], 42.0).unwrap();
    assert_eq!(copy.to_vec::<f32>().unwrap(), vec![0., 1., 2., 3.]);
    assert_eq!(copy.ownership().unwrap(), Ownership::Owned);
}

#[test]
fn test_slice_rejects_bad_specs() {
    let view = iota(&[3, 4]);
    assert!(matches!(
        view.slice(&[SliceSpec::Full, SliceSpec::Full, SliceSpec::Full]),
        Err(TensorError::InvalidArgument(_))
    ));
    assert!(matches!(
        view.slice(&[SliceSpec::range(2, 1)]),
        Err(TensorError::IndexOutOfRange { axis: 0, .. })
    ));
    assert!(matches!(
        view.slice(&[SliceSpec::Index(3)]),
        Err(TensorError::IndexOutOfRange { axis: 0, .. })
    ));
    assert!(matches!(
        view.slice(&[SliceSpec::Full, SliceSpec::range(0, 5)]),
        Err(TensorError::IndexOutOfRange { axis: 1, .. })
    ));
}

#[test]
fn test_concat_along_first_axis() {
    let a = iota(&[1, 3]);
    let b = TensorView::from_elements(&[2, 3], &[10f32, 11., 12., 13., 14., 15.]).unwrap();
    let out = TensorView::concat(&[&a, &b], 0).unwrap();
    assert_eq!(out.shape(), &[3, 3]);
    assert_eq!(
        out.to_vec::<f32>().unwrap(),
        vec![0., 1., 2., 10., 11., 12., 13., 14., 15.]
    );
}

#[test]
fn test_concat_along_inner_axis_with_uneven_extents() {
    let a = TensorView::from_elements(&[2, 1], &[1i32, 2]).unwrap();
    let b = TensorView::from_elements(&[2, 2], &[10i32, 11, 20, 21]).unwrap();
    let out = TensorView::concat(&[&a, &b], 1).unwrap();
    assert_eq!(out.shape(), &[2, 3]);
    assert_eq!(out.to_vec::<i32>().unwrap(), vec![1, 10, 11, 2, 20, 21]);
}

#[test]
fn test_concat_single_input_is_a_copy() {
    let a = iota(&[2, 2]);
    let out = TensorView::concat(&[&a], 1).unwrap();
    assert_eq!(out.shape(), a.shape());
    assert_eq!(out.to_vec::<f32>().unwrap(), a.to_vec::<f32>().unwrap());
}

#[test]
fn test_concat_errors() {
    let a = iota(&[2, 2]);
    assert_eq!(
        TensorView::concat(&[], 0).unwrap_err(),
        TensorError::EmptyInput
    );

    let ints = TensorView::from_elements(&[2, 2], &[0i32; 4]).unwrap();
    assert!(matches!(
        TensorView::concat(&[&a, &ints], 0),
        Err(TensorError::DtypeMismatch { .. })
    ));

    let flat = iota(&[4]);
    assert!(matches!(
        TensorView::concat(&[&a, &flat], 0),
        Err(TensorError::RankMismatch { .. })
    ));

    assert_eq!(
        TensorView::concat(&[&a, &a], 2).unwrap_err(),
        TensorError::InvalidAxis { axis: 2, rank: 2 }
    );

    let wide = iota(&[2, 3]);
    assert_eq!(
        TensorView::concat(&[&a, &wide], 0).unwrap_err(),
        TensorError::ShapeMismatch {
            axis: 1,
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn test_disposed_view_rejects_operations() {
    let mut view = iota(&[2]);
    view.dispose();
    view.dispose();

    assert!(view.is_disposed());
    assert_eq!(view.shape(), &[2]);
    assert_eq!(view.read_raw().unwrap_err(), TensorError::Disposed);
    assert_eq!(view.lease().unwrap_err(), TensorError::Disposed);
    assert_eq!(view.slice(&[]).unwrap_err(), TensorError::Disposed);
    assert_eq!(view.reshape(&[1, 2]).unwrap_err(), TensorError::Disposed);
    assert_eq!(view.set_element(&[0], 1.0).unwrap_err(), TensorError::Disposed);
    assert_eq!(view.write_raw(&[0; 8]).unwrap_err(), TensorError::Disposed);

    let other = iota(&[2]);
    assert_eq!(
        TensorView::concat(&[&other, &view], 0).unwrap_err(),
        TensorError::Disposed
    );
}

#[test]
fn test_lease_outlives_dispose() {
    let mut view = iota(&[3]);
    let lease = view.lease().unwrap();
    view.dispose();
    assert_eq!(lease.len(), 12);
    assert_eq!(lease.to_vec(), iota(&[3]).read_raw().unwrap().to_vec());
}

#[test]
fn test_concat_rejects_overflowing_axis() {
    let empty = TensorView::from_elements::<u8>(&[0, 1 << 62], &[]).unwrap();
    let err = TensorView::concat(&[&empty, &empty, &empty, &empty], 1).unwrap_err();
    assert!(matches!(err, TensorError::InvalidShape(_)));
}

#[test]
fn test_writes_leave_leases_untouched() {
    let mut view = iota(&[3]);
    let lease = view.lease().unwrap();

    view.write_raw(bytemuck::cast_slice(&[7f32, 8., 9.])).unwrap();
    view.set_element(&[0], 1.0).unwrap();

    assert_eq!(view.to_vec::<f32>().unwrap(), vec![1., 8., 9.]);
    assert_eq!(
        bytemuck::pod_collect_to_vec::<u8, f32>(&lease.read()),
        vec![0., 1., 2.]
    );
}
