use half::f16;
use yolo_postprocess::common::OutputConvention;
use yolo_postprocess::detection_runners::{OwnedTensor, TensorView};

use tensors::*;

#[test]
fn element_at_drops_the_batch_axis() {
    let data = (0..6).map(|x| x as f32).collect::<Vec<_>>();

    let batched = TensorView::new(&data, &[1, 2, 3]).unwrap();
    assert_eq!(batched.dims(), (2, 3));
    assert_eq!(batched.element_at(0, 0), 0.);
    assert_eq!(batched.element_at(0, 2), 2.);
    assert_eq!(batched.element_at(1, 0), 3.);
    assert_eq!(batched.element_at(1, 2), 5.);

    let flat = TensorView::new(&data, &[2, 3]).unwrap();
    assert_eq!(flat.dims(), (2, 3));
    for outer in 0..2 {
        for inner in 0..3 {
            assert_eq!(flat.element_at(outer, inner), batched.element_at(outer, inner));
        }
    }
}

#[test]
#[should_panic]
fn element_at_out_of_range_panics() {
    let data = vec![0f32; 6];
    let tensor = TensorView::new(&data, &[1, 2, 3]).unwrap();
    tensor.element_at(2, 0);
}

#[test]
fn legacy_records_are_the_transpose() {
    let records = vec![
        legacy_record(10., 20., 30., 40., 2, 0, 0.9),
        legacy_record(11., 21., 31., 41., 2, 1, 0.8),
        legacy_record(12., 22., 32., 42., 2, 0, 0.7),
    ];
    let (data, shape) = legacy_tensor(&records);
    let tensor = TensorView::new(&data, &shape).unwrap();
    let convention = OutputConvention::Legacy;

    assert_eq!(tensor.anchor_or_detection_count(convention), 3);
    assert_eq!(tensor.feature_or_stride_count(convention), 6);

    let anchors = 3;
    let view = tensor.records(convention);
    assert_eq!(view.dim(), (3, 6));
    for (a, record) in records.iter().enumerate() {
        for (f, value) in record.iter().enumerate() {
            assert_eq!(tensor.element_at(f, a), data[f * anchors + a]);
            assert_eq!(tensor.element_at(f, a), *value);
            assert_eq!(view[[a, f]], tensor.element_at(f, a));
        }
    }
}

#[test]
fn fixed_stride_records_keep_the_row_order() {
    let mut keyed = fixed_row(1., 2., 3., 4., 0.5, 7);
    keyed.extend([100., 200., 0.25]);
    let mut other = fixed_row(5., 6., 7., 8., 0.6, 2);
    other.extend([300., 400., 0.75]);
    let (data, shape) = fixed_tensor(&[keyed, other]);
    let tensor = TensorView::new(&data, &shape).unwrap();
    let convention = OutputConvention::FixedStride;

    assert_eq!(tensor.anchor_or_detection_count(convention), 2);
    assert_eq!(tensor.feature_or_stride_count(convention), 9);

    let view = tensor.records(convention);
    assert_eq!(view.dim(), (2, 9));
    for d in 0..2 {
        for f in 0..9 {
            assert_eq!(tensor.element_at(d, f), data[d * 9 + f]);
            assert_eq!(view[[d, f]], tensor.element_at(d, f));
        }
    }
    assert_eq!(tensor.element_at(0, 5), 7.);
    assert_eq!(tensor.element_at(1, 8), 0.75);
}

#[test]
fn f16_outputs_are_widened() {
    let data = [0.5f32, 1.0, -2.0, 640.0, 0.25, 3.0]
        .iter()
        .map(|x| f16::from_f32(*x))
        .collect::<Vec<_>>();
    let owned = OwnedTensor::from_f16(&data, &[1, 1, 6]);
    assert_eq!(owned.shape(), &[1, 1, 6]);

    let tensor = owned.view().unwrap();
    assert_eq!(tensor.dims(), (1, 6));
    assert_eq!(tensor.element_at(0, 3), 640.);
    assert_eq!(tensor.element_at(0, 5), 3.);
}
