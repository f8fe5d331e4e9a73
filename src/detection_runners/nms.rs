use crate::common::YoloBox;

pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
}

impl Nms for (YoloBox, f32) {
    fn iou(&self, other: &Self) -> f32 {
        self.0.iou(&other.0)
    }

    fn confidence(&self) -> f32 {
        self.1
    }
}

/// Greedy non-maximum suppression over one class's candidates.
///
/// Candidates are sorted by confidence descending; the sort is stable, so on an exact
/// tie the one inserted first is kept first. A candidate is dropped when its IoU with
/// any already-kept box is strictly greater than `iou_threshold`. The kept boxes are
/// returned in the order they were kept.
pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32) {
    boxes.sort_by(|b1, b2| {
        b2.confidence()
            .partial_cmp(&b1.confidence())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut current_index = 0;
    for index in 0..boxes.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            let iou = boxes[prev_index].iou(&boxes[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            boxes.swap(current_index, index);
            current_index += 1;
        }
    }
    boxes.truncate(current_index);
}

/// Same as [`nms`] but consumes and returns the list.
pub fn suppressed<T: Nms>(mut boxes: Vec<T>, iou_threshold: f32) -> Vec<T> {
    nms(&mut boxes, iou_threshold);
    boxes
}
