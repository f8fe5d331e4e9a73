use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use yolo_postprocess::common::{Detection, Keypoint, YoloBox};
use yolo_postprocess::detection_runners::nms::{self, Nms};

fn random_boxes(rng: &mut StdRng, n: usize) -> Vec<(YoloBox, f32)> {
    (0..n)
        .map(|_| {
            let bbox = YoloBox::default().with_x1y1_wh(
                rng.gen_range(0.0..200.0),
                rng.gen_range(0.0..200.0),
                rng.gen_range(1.0..80.0),
                rng.gen_range(1.0..80.0),
            );
            (bbox, rng.gen_range(0.0..1.0))
        })
        .collect()
}

#[test]
fn suppression_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(42);
    for iou_threshold in [0.0, 0.3, 0.45, 0.7, 1.0] {
        let boxes = random_boxes(&mut rng, 200);
        let once = nms::suppressed(boxes, iou_threshold);
        let twice = nms::suppressed(once.clone(), iou_threshold);
        assert!(!once.is_empty());
        assert_eq!(once, twice);
    }
}

#[test]
fn kept_boxes_do_not_overlap_past_threshold() {
    let mut rng = StdRng::seed_from_u64(3);
    let iou_threshold = 0.45;
    let kept = nms::suppressed(random_boxes(&mut rng, 300), iou_threshold);

    for (i, a) in kept.iter().enumerate() {
        for b in kept.iter().skip(i + 1) {
            assert!(a.iou(b) <= iou_threshold);
            // kept in confidence order
            assert!(a.confidence() >= b.confidence());
        }
    }
}

#[test]
fn ties_keep_insertion_order() {
    let bbox = YoloBox::new(0., 0., 10., 10.);
    let first = Detection::new(0, bbox, "first", 0.5);
    let second = Detection::new(0, bbox, "second", 0.5);

    let kept = nms::suppressed(vec![first, second], 0.5);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].class_name, "first");
}

#[test]
fn zero_area_boxes_have_zero_iou() {
    let a = YoloBox::new(5., 5., 5., 5.);
    let b = YoloBox::new(5., 5., 5., 5.);
    assert_eq!(a.iou(&b), 0.);

    let kept = nms::suppressed(vec![(a, 0.9), (b, 0.8)], 0.);
    assert_eq!(kept.len(), 2);
}

#[test]
fn empty_input_is_empty() {
    let kept: Vec<(YoloBox, f32)> = nms::suppressed(Vec::new(), 0.45);
    assert!(kept.is_empty());
}

#[test]
fn detection_builders_fill_derived_fields() {
    let bbox = YoloBox::new(64., 32., 128., 96.);
    let plain = Detection::new(2, bbox, "car", 0.7).with_input_size(640., 320.);
    assert_eq!(plain.normalized_bbox, bbox.normalized(640., 320.));
    assert!(!plain.is_segment());
    assert!(!plain.is_pose());

    let extras = plain
        .clone()
        .with_mask_coefficients(vec![0.1, -0.2])
        .with_keypoints(vec![Keypoint { x: 70., y: 40., confidence: 0.9 }]);
    assert!(extras.is_segment());
    assert!(extras.is_pose());
    assert_eq!(extras.bbox, plain.bbox);
}
