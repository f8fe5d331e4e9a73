use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use yolo_postprocess::common::{ModelOutputDescriptor, OutputConvention};
use yolo_postprocess::data::Thresholds;
use yolo_postprocess::detection_runners::{DetectionPipeline, TensorView};

use tensors::*;

fn random_fixed_rows(rng: &mut StdRng, n: usize, nc: usize) -> Vec<Vec<f32>> {
    (0..n)
        .map(|_| {
            let x1 = rng.gen_range(0.0..600.0);
            let y1 = rng.gen_range(0.0..600.0);
            // about a third of the rows are degenerate
            let w = rng.gen_range(-20.0..80.0);
            let h = rng.gen_range(-20.0..80.0);
            fixed_row(x1, y1, x1 + w, y1 + h, rng.gen_range(0.0..1.0), rng.gen_range(0..nc))
        })
        .collect()
}

/// Isolated same-class pairs: each pair overlaps with IoU 0.5, nothing else overlaps.
fn isolated_pairs(rng: &mut StdRng, pairs: usize, nc: usize) -> Vec<Vec<f32>> {
    let mut rows = Vec::new();
    for p in 0..pairs {
        let x = (p * 20) as f32;
        let class = rng.gen_range(0..nc);
        rows.push(fixed_row(x, 0., x + 4., 4., rng.gen_range(0.0..1.0), class));
        rows.push(fixed_row(x, 0., x + 4., 2., rng.gen_range(0.0..1.0), class));
    }
    rows
}

#[test]
fn raising_confidence_never_adds_candidates() {
    let mut rng = StdRng::seed_from_u64(11);
    let (data, shape) = fixed_tensor(&random_fixed_rows(&mut rng, 500, 5));
    let tensor = TensorView::new(&data, &shape).unwrap();
    let pipeline = DetectionPipeline::new(ModelOutputDescriptor::detect(5, OutputConvention::FixedStride)).unwrap();

    let mut previous = usize::MAX;
    for step in 0..=10 {
        let thresholds = Thresholds::default().with_confidence(step as f32 / 10.);
        let count = pipeline.count_candidates(&tensor, &thresholds).unwrap();
        assert!(count <= previous);
        previous = count;
    }
    assert_eq!(previous, 0);
}

#[test]
fn raising_confidence_never_adds_detections() {
    let mut rng = StdRng::seed_from_u64(13);
    let (data, shape) = fixed_tensor(&random_fixed_rows(&mut rng, 500, 3));
    let tensor = TensorView::new(&data, &shape).unwrap();
    let pipeline = DetectionPipeline::new(ModelOutputDescriptor::detect(3, OutputConvention::FixedStride)).unwrap();

    for max_detections in [10, 1000] {
        let mut previous = usize::MAX;
        for step in 0..=20 {
            let thresholds = Thresholds::new(step as f32 / 20., 0.3, max_detections);
            let count = pipeline.run(&tensor, &thresholds).unwrap().len();
            assert!(count <= previous, "conf {}", thresholds.confidence_threshold);
            previous = count;
        }
    }
}

#[test]
fn raising_iou_can_shrink_output_through_a_suppression_chain() {
    // A overlaps B a little; B overlaps C and D more
    let (data, shape) = fixed_tensor(&[
        fixed_row(0., 0., 10., 10., 0.9, 0),
        fixed_row(8., 0., 18., 10., 0.8, 0),
        fixed_row(13., 0., 18., 5., 0.7, 0),
        fixed_row(13., 5., 18., 10., 0.6, 0),
    ]);
    let tensor = TensorView::new(&data, &shape).unwrap();
    let pipeline = DetectionPipeline::new(ModelOutputDescriptor::detect(1, OutputConvention::FixedStride)).unwrap();

    let low = pipeline.run(&tensor, &Thresholds::default().with_iou(0.1)).unwrap();
    let high = pipeline.run(&tensor, &Thresholds::default().with_iou(0.2)).unwrap();
    assert_eq!(low.len(), 3);
    assert_eq!(high.len(), 2);
}

#[test]
fn iou_is_monotone_without_suppression_chains() {
    let mut rng = StdRng::seed_from_u64(5);
    let (data, shape) = fixed_tensor(&isolated_pairs(&mut rng, 100, 3));
    let tensor = TensorView::new(&data, &shape).unwrap();
    let pipeline = DetectionPipeline::new(ModelOutputDescriptor::detect(3, OutputConvention::FixedStride)).unwrap();
    let base = Thresholds::default().with_max_detections(1000);

    let mut previous = usize::MAX;
    for step in 0..10 {
        let thresholds = base.with_confidence(step as f32 / 10.);
        let count = pipeline.run(&tensor, &thresholds).unwrap().len();
        assert!(count <= previous, "conf {}", thresholds.confidence_threshold);
        previous = count;
    }

    let mut previous = 0;
    for iou in [0.0, 0.25, 0.49, 0.5, 0.75, 1.0] {
        let count = pipeline.run(&tensor, &base.with_iou(iou)).unwrap().len();
        assert!(count >= previous, "iou {iou}");
        previous = count;
    }
}

#[test]
fn overlapping_boxes_of_different_classes_survive_any_iou() {
    let (data, shape) = fixed_tensor(&[
        fixed_row(0., 0., 10., 10., 0.9, 0),
        fixed_row(0., 0., 10., 10., 0.8, 1),
        fixed_row(0., 0., 10., 10., 0.7, 2),
    ]);
    let tensor = TensorView::new(&data, &shape).unwrap();
    let pipeline = DetectionPipeline::new(ModelOutputDescriptor::detect(3, OutputConvention::FixedStride)).unwrap();

    for iou in [0.0, 0.5, 1.0] {
        let detections = pipeline.run(&tensor, &Thresholds::default().with_iou(iou)).unwrap();
        assert_eq!(detections.len(), 3);
    }
}

#[test]
fn degenerate_rows_never_appear() {
    let mut rng = StdRng::seed_from_u64(19);
    let (data, shape) = fixed_tensor(&random_fixed_rows(&mut rng, 800, 4));
    let tensor = TensorView::new(&data, &shape).unwrap();
    let pipeline = DetectionPipeline::new(ModelOutputDescriptor::detect(4, OutputConvention::FixedStride)).unwrap();

    for _ in 0..20 {
        let thresholds = Thresholds::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0), 1000);
        for d in pipeline.run(&tensor, &thresholds).unwrap() {
            assert!(d.bbox.w > 0. && d.bbox.h > 0.);
        }
    }
}

#[test]
fn output_never_exceeds_max_detections() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..20 {
        let n = rng.gen_range(0..400);
        let (data, shape) = fixed_tensor(&random_fixed_rows(&mut rng, n, 6));
        let tensor = TensorView::new(&data, &shape).unwrap();
        let pipeline = DetectionPipeline::new(ModelOutputDescriptor::detect(6, OutputConvention::FixedStride)).unwrap();

        let max_detections = rng.gen_range(1..50);
        let thresholds = Thresholds::new(0.05, 0.6, max_detections);
        let detections = pipeline.run(&tensor, &thresholds).unwrap();
        assert!(detections.len() <= max_detections);
    }
}
