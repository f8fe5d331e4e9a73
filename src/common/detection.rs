use serde::{Deserialize, Serialize};
use crate::common::YoloBox;
use crate::detection_runners::nms::Nms;

/// One pose keypoint in model-input pixel space.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

/// One retained, post-NMS prediction.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_index: usize,
    pub class_name: String,
    pub confidence: f32,
    /// Box in model-input pixel coordinates.
    pub bbox: YoloBox,
    /// Same box divided by the model input size and clamped to the unit square.
    pub normalized_bbox: YoloBox,
    pub mask_coefficients: Vec<f32>,
    pub keypoints: Vec<Keypoint>,
}

impl Nms for Detection {
    /// Computes the intersection over union (IoU) between this detection's box and another.
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    /// Returns the confidence score of the detection.
    fn confidence(&self) -> f32 {
        self.confidence
    }
}

impl Detection {
    pub fn new(class_index: usize, bbox: YoloBox, class_name: &str, confidence: f32) -> Self {
        Self {
            class_index,
            class_name: class_name.to_string(),
            confidence,
            bbox,
            ..Default::default()
        }
    }

    /// Recomputes `normalized_bbox` from `bbox` for the given model input size.
    pub fn with_input_size(mut self, input_width: f32, input_height: f32) -> Self {
        self.normalized_bbox = self.bbox.normalized(input_width, input_height);
        self
    }

    pub fn with_mask_coefficients(mut self, coefficients: Vec<f32>) -> Self {
        self.mask_coefficients = coefficients;
        self
    }

    pub fn with_keypoints(mut self, keypoints: Vec<Keypoint>) -> Self {
        self.keypoints = keypoints;
        self
    }

    pub fn is_segment(&self) -> bool {
        !self.mask_coefficients.is_empty()
    }

    pub fn is_pose(&self) -> bool {
        !self.keypoints.is_empty()
    }
}
